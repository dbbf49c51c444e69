//! Reading configuration values from the environment, falling back to docker secrets.
use std::env::var;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const DOCKER_SECRETS_PATH: &str = "/run/secrets/";

/// Read a docker secret by name from the secrets mount at `dir`.
fn read_secret(dir: &Path, name: &str) -> Result<String, std::io::Error> {
    let mut secret_val = String::new();
    File::open(dir.join(name.to_lowercase()))?.read_to_string(&mut secret_val)?;
    Ok(secret_val.trim_end().to_owned())
}

/// Look up `name` in the environment. If it is absent or empty, look up
/// `{name}_DOCKER_SECRET` and read the docker secret it names.
///
/// Returns `Ok(None)` when neither variable is set.
pub fn env_or_secret(name: &str) -> Result<Option<String>, std::io::Error> {
    env_or_secret_in(Path::new(DOCKER_SECRETS_PATH), name)
}

fn env_or_secret_in(dir: &Path, name: &str) -> Result<Option<String>, std::io::Error> {
    if let Some(value) = var(name).ok().filter(|value| !value.is_empty()) {
        return Ok(Some(value));
    }
    match var(format!("{name}_DOCKER_SECRET")) {
        Ok(secret_name) => read_secret(dir, &secret_name).map(Some),
        Err(_) => Ok(None),
    }
}
