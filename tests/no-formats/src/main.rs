#![allow(dead_code)]

use confill::Config;

#[derive(Config)]
struct Conf {
    #[config(required, expand)]
    username: String,

    normal: u32,

    opt: Option<String>,

    nested: Nested,
}

#[derive(Config)]
struct Nested {
    #[config(key = "APP_PORT")]
    port: u16,

    #[config(default = "x-user,x-password", separator = ",")]
    headers: Vec<String>,
}

fn main() -> Result<(), confill::Error> {
    let mut conf = Conf::zero_value();
    confill::load()
        .file(".env")
        .file("config.toml")
        .env()
        .load_into(&mut conf)
}
