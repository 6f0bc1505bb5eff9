use std::io::Write;

use pretty_assertions::assert_eq;

use crate::ErrorKind;
use super::*;


fn vars(pairs: &[(&str, &str)]) -> Vars {
    pairs.iter().copied().collect()
}

fn dotenv(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".env").tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn keys_from_path() {
    let env = EnvProvider::new();
    assert_eq!(env.key(None, &["port"]), "PORT");
    assert_eq!(env.key(None, &["db", "max_conn"]), "DB_MAX_CONN");
    assert_eq!(env.key(None, &["httpServer", "bindAddr"]), "HTTP_SERVER_BIND_ADDR");

    let env = EnvProvider::new().prefix("APP_");
    assert_eq!(env.key(None, &["db", "host"]), "APP_DB_HOST");
    assert_eq!(env.key(Some("DATABASE_URL"), &["db", "url"]), "APP_DATABASE_URL");
}

#[test]
fn key_options() {
    let env = EnvProvider::new().upper_case(false);
    assert_eq!(env.key(None, &["db", "maxConn"]), "db_max_conn");

    let env = EnvProvider::new().snake_case(false).upper_case(false);
    assert_eq!(env.key(None, &["db", "maxConn"]), "db_maxConn");

    let env = EnvProvider::new().field_separator("__");
    assert_eq!(env.key(None, &["db", "max_conn"]), "DB__MAX_CONN");

    // Explicit keys are used verbatim.
    let env = EnvProvider::new().prefix("x_");
    assert_eq!(env.key(Some("Port"), &["port"]), "x_Port");
}

#[test]
fn provide() {
    let env = EnvProvider::new();
    let vars = vars(&[("PORT", "80")]);
    assert_eq!(env.provide(&vars, None, &["port"]).unwrap(), "80");

    let err = env.provide(&vars, None, &["host"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::KeyNotFound);
    assert_eq!(err.to_string(), r#"key not found: "HOST""#);
}

#[test]
fn dotenv_merge() {
    let file = dotenv("# comment\nPORT=1\nHOST=\"file-host\"\n\nUSER=file\n");
    let env = EnvProvider::from_file(file.path());
    let merged = env.env_map(&vars(&[("PORT", "2")])).unwrap();

    assert_eq!(merged.get("PORT"), Some("2"));
    assert_eq!(merged.get("HOST"), Some("file-host"));
    assert_eq!(merged.get("USER"), Some("file"));
}

#[test]
fn own_snapshot_wins() {
    let env = EnvProvider::new().vars(vars(&[("A", "own")]));
    let merged = env.env_map(&vars(&[("A", "loader")])).unwrap();
    assert_eq!(merged.get("A"), Some("own"));
}

#[test]
fn missing_dotenv() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.env");

    let merged = EnvProvider::from_file(&path).env_map(&vars(&[("A", "1")])).unwrap();
    assert_eq!(merged, vars(&[("A", "1")]));

    let err = EnvProvider::from_file(&path).required().env_map(&Vars::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingRequiredFile);
}

#[test]
fn malformed_dotenv() {
    let file = dotenv("THIS IS NOT VALID\n");
    let err = EnvProvider::from_file(file.path()).env_map(&Vars::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
}

#[test]
fn name() {
    assert_eq!(EnvProvider::new().name(), "ENV provider");
    assert!(EnvProvider::new().filler().is_some());
    assert!(EnvProvider::new().unmarshaler().is_none());
}
