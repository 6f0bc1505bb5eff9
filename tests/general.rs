use std::time::Duration;
use pretty_assertions::assert_eq;

use confill::{
    chrono::{DateTime, FixedOffset, TimeZone, Utc},
    meta, num_complex::Complex, url::Url,
    Config, ErrorKind, Input, Kind, Reflect, Vars,
};


fn vars(pairs: &[(&str, &str)]) -> Vars {
    pairs.iter().copied().collect()
}

fn load_env<T: Reflect>(conf: &mut T, pairs: &[(&str, &str)]) -> Result<(), confill::Error> {
    confill::load().env().with_vars(vars(pairs)).load_into(conf)
}

#[test]
fn simple() {
    /// Root doc comment banana.
    #[derive(Config)]
    #[allow(dead_code)]
    struct Animals {
        /// Doc comment for cat.
        #[config(default = 8080)]
        cat: u32,

        /// Doc comment for dog.
        #[config(key = "DOGGO", json = "doggo,omitempty", required)]
        dog: String,
    }

    assert_eq!(Animals::META, meta::Meta {
        name: "Animals",
        doc: &[" Root doc comment banana."],
        fields: &[
            meta::Field {
                name: "cat",
                doc: &[" Doc comment for cat."],
                tags: meta::Tags {
                    default: Some("8080"),
                    ..meta::Tags::EMPTY
                },
            },
            meta::Field {
                name: "dog",
                doc: &[" Doc comment for dog."],
                tags: meta::Tags {
                    key: Some("DOGGO"),
                    json: Some("doggo,omitempty"),
                    required: true,
                    ..meta::Tags::EMPTY
                },
            },
        ],
    });

    let zero = Animals::zero_value();
    assert_eq!(zero.cat, 0);
    assert_eq!(zero.dog, "");
}

mod full {
    #![allow(dead_code)]

    use super::*;

    #[derive(Config)]
    pub(crate) struct Conf {
        pub(crate) name: String,
        pub(crate) http: Http,
        pub(crate) cache: Option<Cache>,

        #[config(ignore)]
        pub(crate) runtime: Vec<u8>,

        #[config(key = "-")]
        pub(crate) also_ignored: String,
    }

    #[derive(Config)]
    pub(crate) struct Http {
        pub(crate) port: u16,
        pub(crate) hosts: Vec<String>,
        pub(crate) tls: Tls,
    }

    #[derive(Config)]
    pub(crate) struct Tls {
        pub(crate) cert: Option<String>,
    }

    #[derive(Config)]
    pub(crate) struct Cache {
        pub(crate) ttl: Duration,
    }
}

#[test]
fn walked_fields() {
    let mut conf = full::Conf::zero_value();
    assert!(conf.cache.is_none());

    let input = Input::with_vars(&mut conf, Vars::default()).unwrap();
    assert_eq!(input.name(), "Conf");

    let fields = input.fields().iter()
        .map(|f| (f.path.join("."), f.kind.clone()))
        .collect::<Vec<_>>();
    assert_eq!(fields, [
        ("name".to_owned(), Kind::String),
        ("http.port".to_owned(), Kind::Uint(16)),
        ("http.hosts".to_owned(), Kind::Sequence(Box::new(Kind::String))),
        ("http.tls.cert".to_owned(), Kind::Optional(Box::new(Kind::String))),
        ("cache.ttl".to_owned(), Kind::Duration),
    ]);
    assert_eq!(input.path(4), "Conf.cache.ttl");
    assert!(input.fields().iter().all(|f| !f.is_set));

    drop(input);
    assert!(conf.cache.is_some(), "optional structs are allocated while walking");
}

#[test]
fn ignored_fields_are_untouched() {
    let mut conf = full::Conf::zero_value();
    conf.runtime = vec![1, 2];
    load_env(&mut conf, &[("RUNTIME", "3 4"), ("ALSO_IGNORED", "x"), ("NAME", "app")]).unwrap();

    assert_eq!(conf.name, "app");
    assert_eq!(conf.runtime, [1, 2]);
    assert_eq!(conf.also_ignored, "");
}

#[test]
fn all_leaf_types() {
    #[derive(Config)]
    struct Conf {
        b: bool,
        i8: i8,
        i64: i64,
        i128: i128,
        u8: u8,
        usize: usize,
        f32: f32,
        f64: f64,
        c64: Complex<f32>,
        c128: Complex<f64>,
        s: String,
        d: Duration,
        t: DateTime<FixedOffset>,
        t_utc: DateTime<Utc>,
        u: Url,
        seq: Vec<u16>,
        arr: [u8; 3],
        opt: Option<u32>,
        opt_seq: Option<Vec<String>>,
        seq_opt: Vec<Option<i32>>,
    }

    let mut conf = Conf::zero_value();
    load_env(&mut conf, &[
        ("B", "true"),
        ("I8", "-128"),
        ("I64", "0x7f"),
        ("I128", "-170141183460469231731687303715884105728"),
        ("U8", "0b1010"),
        ("USIZE", "1_000"),
        ("F32", "1.5"),
        ("F64", "-2e-3"),
        ("C64", "1+2i"),
        ("C128", "(3-4i)"),
        ("S", "hello world"),
        ("D", "1m 30s"),
        ("T", "2021-03-04T05:06:07+02:00"),
        ("T_UTC", "2021-03-04T05:06:07Z"),
        ("U", "https://example.com/path?q=1"),
        ("SEQ", "1 2  3"),
        ("ARR", "7 8"),
        ("OPT", "42"),
        ("OPT_SEQ", "a b"),
        ("SEQ_OPT", "-1 2"),
    ]).unwrap();

    assert!(conf.b);
    assert_eq!(conf.i8, -128);
    assert_eq!(conf.i64, 127);
    assert_eq!(conf.i128, i128::MIN);
    assert_eq!(conf.u8, 10);
    assert_eq!(conf.usize, 1000);
    assert_eq!(conf.f32, 1.5);
    assert_eq!(conf.f64, -0.002);
    assert_eq!(conf.c64, Complex::new(1.0, 2.0));
    assert_eq!(conf.c128, Complex::new(3.0, -4.0));
    assert_eq!(conf.s, "hello world");
    assert_eq!(conf.d, Duration::from_secs(90));
    assert_eq!(
        conf.t,
        FixedOffset::east_opt(2 * 3600).unwrap().with_ymd_and_hms(2021, 3, 4, 5, 6, 7).unwrap(),
    );
    assert_eq!(conf.t_utc, Utc.with_ymd_and_hms(2021, 3, 4, 5, 6, 7).unwrap());
    assert_eq!(conf.u.as_str(), "https://example.com/path?q=1");
    assert_eq!(conf.seq, [1, 2, 3]);
    assert_eq!(conf.arr, [7, 8, 0]);
    assert_eq!(conf.opt, Some(42));
    assert_eq!(conf.opt_seq, Some(vec!["a".to_owned(), "b".to_owned()]));
    assert_eq!(conf.seq_opt, [Some(-1), Some(2)]);
}

#[test]
fn zero_values() {
    #[derive(Config)]
    #[allow(dead_code)]
    struct Conf {
        t: DateTime<Utc>,
        u: Url,
        arr: [i8; 2],
        nested: Option<Inner>,
    }

    #[derive(Config)]
    #[allow(dead_code)]
    struct Inner {
        x: f64,
    }

    let conf = Conf::zero_value();
    assert_eq!(conf.t, DateTime::<Utc>::default());
    assert_eq!(conf.u.as_str(), "about:blank");
    assert_eq!(conf.arr, [0, 0]);
    assert!(conf.nested.is_none());
}

#[test]
fn defaults() {
    #[derive(Config)]
    struct Conf {
        #[config(default = "localhost")]
        host: String,

        #[config(default = 8080)]
        port: u16,

        #[config(default = 0.5)]
        ratio: f32,

        #[config(default = true)]
        debug: bool,

        #[config(default = "a,b", separator = ",")]
        tags: Vec<String>,

        #[config(default = "2020-01-02", format = "%Y-%m-%d")]
        since: DateTime<Utc>,

        #[config(default = "")]
        empty: String,
    }

    let mut conf = Conf::zero_value();
    load_env(&mut conf, &[("PORT", "9000")]).unwrap();

    assert_eq!(conf.host, "localhost");
    assert_eq!(conf.port, 9000);
    assert_eq!(conf.ratio, 0.5);
    assert!(conf.debug);
    assert_eq!(conf.tags, ["a", "b"]);
    assert_eq!(conf.since, Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap());
    assert_eq!(conf.empty, "");
}

#[test]
fn invalid_default() {
    #[derive(Config)]
    struct Conf {
        #[config(default = "lots")]
        retries: u8,
    }

    let mut conf = Conf::zero_value();
    let err = load_env(&mut conf, &[]).unwrap_err();
    assert_eq!(err.errors().len(), 1);
    assert_eq!(err.errors()[0].kind(), ErrorKind::Parse);
    assert_eq!(err.errors()[0].path(), Some("Conf.retries"));
}

#[test]
fn required() {
    #[derive(Config)]
    #[allow(dead_code)]
    struct Conf {
        #[config(required)]
        token: String,

        db: Db,
    }

    #[derive(Config)]
    #[allow(dead_code)]
    struct Db {
        #[config(required)]
        url: String,

        #[config(required)]
        user: String,
    }

    let mut conf = Conf::zero_value();
    let err = load_env(&mut conf, &[("DB_USER", "")]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Multiple);

    let paths = err.errors().iter().map(|e| (e.kind(), e.path())).collect::<Vec<_>>();
    assert_eq!(paths, [
        (ErrorKind::RequiredField, Some("Conf.token")),
        (ErrorKind::RequiredField, Some("Conf.db.url")),
    ]);
    assert_eq!(
        err.to_string(),
        "confill:\n  * missing value: \"Conf.token\" is required\n  \
            * missing value: \"Conf.db.url\" is required",
    );
}

#[test]
fn expand() {
    #[derive(Config)]
    struct Conf {
        #[config(expand)]
        url: String,

        #[config(expand, default = "${HOME}/cache")]
        cache: String,

        #[config(expand)]
        maybe: Option<String>,

        not_expanded: String,
    }

    let mut conf = Conf::zero_value();
    load_env(&mut conf, &[
        ("HOME", "/home/anna"),
        ("USER", "anna"),
        ("URL", "postgres://$USER@${HOST}/db"),
        ("MAYBE", "$USER"),
        ("NOT_EXPANDED", "$USER"),
    ]).unwrap();

    assert_eq!(conf.url, "postgres://anna@/db");
    assert_eq!(conf.cache, "/home/anna/cache");
    assert_eq!(conf.maybe.as_deref(), Some("anna"));
    assert_eq!(conf.not_expanded, "$USER");
}

#[test]
fn expand_non_string() {
    #[derive(Config)]
    struct Conf {
        #[config(expand)]
        port: u16,
    }

    let mut conf = Conf::zero_value();
    load_env(&mut conf, &[("PORT", "${P}"), ("P", "8080")]).unwrap();
    assert_eq!(conf.port, 8080);
}

#[test]
fn loading_twice_is_idempotent() {
    #[derive(Config)]
    struct Conf {
        #[config(default = "a b")]
        items: Vec<String>,
        count: u32,
    }

    let loader = confill::load().env().with_vars(vars(&[("COUNT", "3")]));
    let mut conf = Conf::zero_value();
    loader.load_into(&mut conf).unwrap();
    loader.load_into(&mut conf).unwrap();

    assert_eq!(conf.items, ["a", "b"]);
    assert_eq!(conf.count, 3);
}

#[test]
fn conversion_errors_are_collected() {
    #[derive(Config)]
    struct Conf {
        small: u8,
        flag: bool,
        ok: String,
    }

    let mut conf = Conf::zero_value();
    let err = load_env(&mut conf, &[("SMALL", "300"), ("FLAG", "yes"), ("OK", "fine")])
        .unwrap_err();

    let kinds = err.errors().iter().map(|e| (e.kind(), e.path())).collect::<Vec<_>>();
    assert_eq!(kinds, [
        (ErrorKind::ValueOverflow, Some("Conf.small")),
        (ErrorKind::Parse, Some("Conf.flag")),
    ]);
    assert_eq!(
        err.errors()[0].to_string(),
        r#"value overflow: "300" overflows type "u8" at "Conf.small""#,
    );
    assert_eq!(conf.ok, "fine");
}

#[test]
fn invalid_roots() {
    #[derive(Config)]
    #[allow(dead_code)]
    struct Conf {
        x: u8,
    }

    let mut absent: Option<Conf> = None;
    let err = confill::load().load_into(&mut absent).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert_eq!(err.to_string(), "confill: invalid input: nil pointer");

    let mut s = String::new();
    let err = confill::load().load_into(&mut s).unwrap_err();
    assert_eq!(err.to_string(), r#"confill: invalid input: non-struct type "alloc::string::String""#);
}

mod manual {
    use confill::{meta, Kind, Reflect, Struct};

    /// A struct whose only field refuses to be written.
    pub(crate) struct Locked {
        pub(crate) value: u8,
    }

    const FIELDS: &[meta::Field] = &[meta::Field {
        name: "value",
        doc: &[],
        tags: meta::Tags::EMPTY,
    }];

    const META: meta::Meta = meta::Meta { name: "Locked", doc: &[], fields: FIELDS };

    impl Reflect for Locked {
        fn shape() -> Kind {
            Kind::Struct("Locked")
        }

        fn zero() -> Option<Self> {
            Some(Self { value: 0 })
        }

        fn kind(&self) -> Kind {
            Self::shape()
        }

        fn as_struct_mut(&mut self) -> Option<&mut dyn Struct> {
            Some(self)
        }
    }

    impl Struct for Locked {
        fn meta(&self) -> &'static meta::Meta {
            &META
        }

        fn field_mut(&mut self, _index: usize) -> Option<&mut dyn Reflect> {
            None
        }
    }
}

#[test]
fn unaddressable_fields_are_skipped() {
    let mut locked = manual::Locked { value: 1 };
    let input = Input::with_vars(&mut locked, Vars::default()).unwrap();
    assert!(input.fields().is_empty());
    drop(input);

    confill::load().env().with_vars(vars(&[("VALUE", "2")])).load_into(&mut locked).unwrap();
    assert_eq!(locked.value, 1);
}

#[test]
fn maps_are_left_alone() {
    use std::collections::{BTreeMap, HashMap};

    #[derive(Config)]
    struct Conf {
        labels: HashMap<String, String>,
        limits: BTreeMap<String, u32>,
    }

    let mut conf = Conf::zero_value();
    conf.limits.insert("cpu".into(), 2);
    load_env(&mut conf, &[("LABELS", "a=b"), ("LIMITS", "cpu=4")]).unwrap();

    assert!(conf.labels.is_empty());
    assert_eq!(conf.limits, BTreeMap::from([("cpu".to_owned(), 2)]));
}
