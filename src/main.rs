use clap::{crate_version, App, Arg};
use folio::build::build_site;
use folio::config::Layout;
use folio::serve;
use tracing_subscriber::EnvFilter;

fn main() {
    let matches = App::new("folio")
        .version(crate_version!())
        .about("Builds a static portfolio site from YAML and Go-style templates")
        .arg(
            Arg::with_name("root")
                .long("root")
                .value_name("DIR")
                .help("The project directory holding config.yml, posts/ and tpl/")
                .takes_value(true)
                .default_value("."),
        )
        .arg(
            Arg::with_name("serve")
                .long("serve")
                .help("Serves the site after building it (same as run=true)"),
        )
        .arg(
            Arg::with_name("port")
                .long("port")
                .value_name("PORT")
                .help("The port for the preview server")
                .takes_value(true)
                .default_value("8081"),
        )
        .get_matches();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(e) = run(&matches) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(matches: &clap::ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let layout = Layout::new(matches.value_of("root").unwrap_or("."));
    let port: u16 = match matches.value_of("port") {
        Some(port) => port
            .parse()
            .map_err(|e| format!("invalid port '{}': {}", port, e))?,
        None => serve::DEFAULT_PORT,
    };

    build_site(&layout)?;
    println!("Build static complete!");

    if matches.is_present("serve") || serve::requested_by_env() {
        println!("Running web server on http://localhost:{}/", port);
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(serve::serve(&layout, port))?;
    }
    Ok(())
}
