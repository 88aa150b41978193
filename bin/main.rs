use clap::{Arg, ArgAction, ArgMatches, Command};
use harv::{ColorChoice, FilterConfig, Har, HarViewer, RenderConfig, ViewConfig};
use simplelog::{Config, LevelFilter, TermLogger, TerminalMode};
use std::io::Write;
use std::path::PathBuf;

fn cli() -> Command {
    Command::new("harv")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A simple command line HAR file viewer")
        .arg(
            Arg::new("file")
                .help("The HAR file to parse")
                .required(true)
                .index(1)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("request-domain")
                .help("Find results where the domain equals this value")
                .long("request-domain")
                .short('D'),
        )
        .arg(
            Arg::new("request-domain-includes")
                .help("Find results where the domain contains this value")
                .long("request-domain-includes")
                .short('d'),
        )
        .arg(
            Arg::new("request-path")
                .help("Find results where the request path equals this value")
                .long("request-path")
                .short('P'),
        )
        .arg(
            Arg::new("request-path-includes")
                .help("Find results where the request path contains this value")
                .long("request-path-includes")
                .short('p'),
        )
        .arg(
            Arg::new("request-has-body")
                .help("Find results where the request has (=true) or lacks (=false) a body")
                .long("request-has-body")
                .short('b')
                .num_args(0..=1)
                .require_equals(true)
                .default_missing_value("true")
                .value_parser(clap::value_parser!(bool)),
        )
        .arg(
            Arg::new("response-has-body")
                .help("Find results where the response has (=true) or lacks (=false) a body")
                .long("response-has-body")
                .short('B')
                .num_args(0..=1)
                .require_equals(true)
                .default_missing_value("true")
                .value_parser(clap::value_parser!(bool)),
        )
        .arg(
            Arg::new("method-in")
                .help("Find requests where the method is one of the provided values")
                .long("method-in")
                .short('m')
                .action(ArgAction::Append)
                .value_delimiter(','),
        )
        .arg(
            Arg::new("response-code")
                .help("Find requests where the response code is equal to the value")
                .long("response-code")
                .short('c')
                .value_parser(clap::value_parser!(i32)),
        )
        .arg(
            Arg::new("response-informational")
                .help("Find requests where the response status is 1xx")
                .long("response-informational")
                .short('i')
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("response-success")
                .help("Find requests where the response status is between 200 and 399")
                .long("response-success")
                .short('s')
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("response-fail")
                .help("Find requests where the response status is between 400 and 599")
                .long("response-fail")
                .short('f')
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("url-matches")
                .help("Find requests whose full URL matches this regular expression")
                .long("url-matches")
                .short('r'),
        )
        .arg(
            Arg::new("print-headers")
                .help("Include request and response headers (Cookie headers are left to -C)")
                .long("print-headers")
                .short('H')
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("print-cookies")
                .help("Include request and response cookies")
                .long("print-cookies")
                .short('C')
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("print-request-body")
                .help("Include the request body, with JSON highlighting")
                .long("print-request-body")
                .short('u')
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("print-response-body")
                .help("Include the response body, with JSON highlighting")
                .long("print-response-body")
                .short('U')
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("print-timings")
                .help("Include the request timings")
                .long("print-timings")
                .short('t')
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("profile")
                .help("YAML file with default filter and render settings")
                .long("profile")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("color")
                .help("When to color the output")
                .long("color")
                .value_parser(["auto", "always", "never"])
                .default_value("auto"),
        )
        .arg(
            Arg::new("verbose")
                .help("Log more diagnostics (repeat for more)")
                .long("verbose")
                .short('v')
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("quiet")
                .help("Only log errors")
                .long("quiet")
                .short('q')
                .action(ArgAction::SetTrue)
                .conflicts_with("verbose"),
        )
}

fn init_logging(matches: &ArgMatches) {
    let level = if matches.get_flag("quiet") {
        LevelFilter::Error
    } else {
        match matches.get_count("verbose") {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    if let Err(e) = TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    ) {
        eprintln!("Failed to initialize logging: {e}");
    }
}

fn filter_from_matches(matches: &ArgMatches) -> FilterConfig {
    FilterConfig {
        domain_equals: matches.get_one::<String>("request-domain").cloned(),
        domain_contains: matches.get_one::<String>("request-domain-includes").cloned(),
        path_equals: matches.get_one::<String>("request-path").cloned(),
        path_contains: matches.get_one::<String>("request-path-includes").cloned(),
        request_has_body: matches.get_one::<bool>("request-has-body").copied(),
        response_has_body: matches.get_one::<bool>("response-has-body").copied(),
        method_in: matches
            .get_many::<String>("method-in")
            .map(|methods| methods.cloned().collect()),
        response_code: matches.get_one::<i32>("response-code").copied(),
        response_informational: matches.get_flag("response-informational"),
        response_successful: matches.get_flag("response-success"),
        response_failed: matches.get_flag("response-fail"),
        url_matches: matches.get_one::<String>("url-matches").cloned(),
    }
}

fn render_from_matches(matches: &ArgMatches) -> RenderConfig {
    RenderConfig {
        headers: matches.get_flag("print-headers"),
        cookies: matches.get_flag("print-cookies"),
        request_body: matches.get_flag("print-request-body"),
        response_body: matches.get_flag("print-response-body"),
        timings: matches.get_flag("print-timings"),
    }
}

fn run(matches: &ArgMatches) -> Result<(), String> {
    let overrides = ViewConfig::new(filter_from_matches(matches), render_from_matches(matches));
    let config = match matches.get_one::<PathBuf>("profile") {
        Some(path) => ViewConfig::load_profile(path.clone())
            .map_err(|e| format!("Failed to load profile: {e}"))?
            .merge(overrides),
        None => overrides,
    };

    let color = matches
        .get_one::<String>("color")
        .and_then(|choice| ColorChoice::parse(choice))
        .unwrap_or_default();
    let viewer = HarViewer::new(config, color.decorator())
        .map_err(|e| format!("Invalid filter configuration: {e}"))?;

    let path = matches
        .get_one::<PathBuf>("file")
        .ok_or("No HAR file provided")?;
    let har =
        Har::load_from_file(path.clone()).map_err(|e| format!("Failed to load archive: {e}"))?;

    let mut stdout = std::io::stdout().lock();
    for entry in viewer.filter(har.entries()) {
        writeln!(stdout, "{}\n", viewer.render(entry))
            .map_err(|e| format!("Failed to write output: {e}"))?;
    }

    Ok(())
}

fn main() {
    let matches = cli().get_matches();
    init_logging(&matches);

    if let Err(e) = run(&matches) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn test_flags_build_configs() {
        let matches = cli()
            .try_get_matches_from([
                "harv",
                "-d",
                "example",
                "-m",
                "get,post",
                "-m",
                "PUT",
                "--request-has-body=false",
                "-B",
                "-s",
                "-c",
                "204",
                "-H",
                "-t",
                "capture.har",
            ])
            .unwrap();

        let filter = filter_from_matches(&matches);
        assert_eq!(filter.domain_contains.as_deref(), Some("example"));
        assert_eq!(
            filter.method_in,
            Some(vec!["get".to_string(), "post".to_string(), "PUT".to_string()])
        );
        assert_eq!(filter.request_has_body, Some(false));
        assert_eq!(filter.response_has_body, Some(true));
        assert_eq!(filter.response_code, Some(204));
        assert!(filter.response_successful);
        assert!(!filter.response_failed);

        let render = render_from_matches(&matches);
        assert!(render.headers);
        assert!(render.timings);
        assert!(!render.cookies);
        assert_eq!(
            matches.get_one::<PathBuf>("file"),
            Some(&PathBuf::from("capture.har"))
        );
    }

    #[test]
    fn test_missing_file_is_rejected() {
        assert!(cli().try_get_matches_from(["harv", "-H"]).is_err());
    }
}
