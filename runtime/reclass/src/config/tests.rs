use super::*;
use pretty_assertions::assert_eq;

fn lookup<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
    move |var| {
        pairs
            .iter()
            .find(|(k, _)| *k == var)
            .map(|(_, v)| (*v).to_owned())
    }
}

#[test]
fn defaults() {
    let config = StoreConfig::default();
    assert_eq!(config.handle_cache_capacity, DEFAULT_HANDLE_CACHE_CAPACITY);
    assert!(config.evict_on_redefine);
}

#[test]
fn builder_setters() {
    let config = StoreConfig::default()
        .with_handle_cache_capacity(0)
        .with_evict_on_redefine(false);
    assert_eq!(
        config,
        StoreConfig {
            handle_cache_capacity: 0,
            evict_on_redefine: false,
        }
    );
}

#[test]
fn empty_environment_gives_defaults() {
    assert_eq!(StoreConfig::from_lookup(lookup(&[])), Ok(StoreConfig::default()));
}

#[test]
fn overrides_from_environment() {
    let config = StoreConfig::from_lookup(lookup(&[
        (HANDLE_CACHE_CAPACITY_VAR, " 128 "),
        (EVICT_ON_REDEFINE_VAR, "Off"),
    ]))
    .unwrap();
    assert_eq!(config.handle_cache_capacity, 128);
    assert!(!config.evict_on_redefine);
}

#[test]
fn rejects_bad_integer() {
    let err = StoreConfig::from_lookup(lookup(&[(HANDLE_CACHE_CAPACITY_VAR, "-4")])).unwrap_err();
    assert_eq!(
        err,
        ConfigError::InvalidInteger {
            var: HANDLE_CACHE_CAPACITY_VAR,
            value: "-4".to_owned(),
        }
    );
    assert_eq!(
        err.to_string(),
        "RECLASS_HANDLE_CACHE_CAPACITY: expected an unsigned integer, got `-4`"
    );
}

#[test]
fn rejects_bad_bool() {
    let err = StoreConfig::from_lookup(lookup(&[(EVICT_ON_REDEFINE_VAR, "maybe")])).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidBool { var: EVICT_ON_REDEFINE_VAR, .. }));
}
