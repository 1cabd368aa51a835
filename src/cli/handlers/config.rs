use std::path::Path;

use crate::cli::commands::{ConfigAction, ConfigCmd};
use crate::io::config_io;

use super::print_json;

/// Only `show` parses the file; `path`, `set` and `init` work on a file that
/// does not deserialize.
pub fn cmd_config(
    config_path: &Path,
    json: bool,
    api_url: Option<String>,
    args: ConfigCmd,
) -> Result<(), Box<dyn std::error::Error>> {
    match args.action.unwrap_or(ConfigAction::Show) {
        ConfigAction::Show => {
            let config = config_io::load_config(config_path, api_url)?;
            if json {
                let mut shown = config.clone();
                shown.api.token = config_io::mask_token(&config.api.token);
                return print_json(&shown);
            }
            print!("{}", config_io::render_config(&config));
            Ok(())
        }
        ConfigAction::Path => {
            println!("{}", config_path.display());
            Ok(())
        }
        ConfigAction::Set(set) => {
            let mut doc = config_io::read_document(config_path)?;
            config_io::set_value(&mut doc, &set.key, &set.value)?;
            config_io::write_document(config_path, &doc)?;
            let shown = if set.key == "api.token" {
                config_io::mask_token(&set.value)
            } else {
                set.value
            };
            println!("{} = {}", set.key, shown);
            Ok(())
        }
        ConfigAction::Init(init) => {
            config_io::init_config(config_path, init.force)?;
            println!("wrote {}", config_path.display());
            println!("next: bka config set api.token <session cookie>");
            Ok(())
        }
    }
}
