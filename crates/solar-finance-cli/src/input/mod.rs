pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Load a command's JSON input from `--input` or, failing that, piped stdin.
pub fn read_input<T: DeserializeOwned>(
    path: Option<&str>,
    what: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        log::debug!("reading {what} input from {path}");
        return file::read_json(path);
    }
    match stdin::read_stdin()? {
        Some(value) => {
            log::debug!("reading {what} input from stdin");
            Ok(value)
        }
        None => Err(format!("--input <file.json> or stdin required for {what}").into()),
    }
}
