#[macro_use]
extern crate trackable;

use clap::{Arg, Command};
use daiquiri::{extras, SetupConfig};

fn main() {
    let matches = Command::new("hello")
        .arg(Arg::new("CONFIG_FILE").index(1).required(true))
        .get_matches();
    let config_file = matches
        .get_one::<String>("CONFIG_FILE")
        .expect("required argument");

    let config = track_try_unwrap!(SetupConfig::from_toml_file(config_file));
    let _guard = track_try_unwrap!(config.setup());

    let logger = daiquiri::get_logger("hello").with("config", config_file.as_str());
    logger.debug("Debugging the greeting");
    logger.info_with("Hello", &extras! { "who" => "world" });
    logger.warning("Hello from a warning");
    logger.error_with("Hello from an error", &extras! { "code" => 42 });
    log::info!("Hello through the log crate");
}
