pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Read a typed input from `--input <path>` or piped stdin, in that order.
pub fn read_required<T: DeserializeOwned>(
    path: &Option<String>,
    what: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return file::read_document(path);
    }
    if let Some(data) = stdin::read_stdin()? {
        return Ok(serde_json::from_value(data)?);
    }
    Err(format!("--input <file.json|file.yaml> or stdin required for {what}").into())
}
