use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "reliability-dashboard",
    version,
    about = "Screenshot scheduler status and rendering reliability dashboard"
)]
pub struct Args {
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,
    #[arg(long, default_value_t = 8080)]
    pub port: u16,
    /// Scheduler API base URL; overrides DASHBOARD_UPSTREAM_BASE_URL.
    #[arg(long)]
    pub upstream: Option<String>,
    #[arg(long, default_value_t = false)]
    pub print_openapi: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_upstream_override() {
        let args = Args::parse_from(["reliability-dashboard", "--upstream", "http://sched:5000", "--port", "9090"]);
        assert_eq!(args.upstream.as_deref(), Some("http://sched:5000"));
        assert_eq!(args.port, 9090);
        assert_eq!(args.host, "127.0.0.1");
        assert!(!args.print_openapi);
    }
}
