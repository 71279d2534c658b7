use super::*;

fn args(argv: &[&str]) -> CliArgs {
    CliArgs::try_parse_from(std::iter::once("sable").chain(argv.iter().copied()))
        .expect("arguments parse")
}

#[test]
fn test_defaults() {
    let args = args(&["a.js"]);
    assert_eq!(args.mode, Mode::Parse);
    assert_eq!(args.print, PrintFormat::None);
    assert_eq!(args.parser_options().unwrap(), ParserOptions::default());
}

#[test]
fn test_paths_are_required() {
    assert!(CliArgs::try_parse_from(["sable"]).is_err());
}

#[test]
fn test_flags_map_to_options() {
    let args = args(&[
        "--mode",
        "validate",
        "--print",
        "tree",
        "--strict",
        "--eval",
        "--eager",
        "--allow-parameter-defaults",
        "--fold-constants",
        "--max-depth",
        "50",
        "src",
    ]);
    assert_eq!(args.mode, Mode::Validate);
    assert_eq!(args.print, PrintFormat::Tree);
    let options = args.parser_options().unwrap();
    assert!(options.strict);
    assert_eq!(options.code_type, CodeType::Eval);
    assert!(options.eager_function_bodies);
    assert!(options.allow_parameter_defaults);
    assert!(options.fold_constants);
    assert_eq!(options.max_recursion_depth, 50);
}

#[test]
fn test_config_file_is_overridden_by_flags() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("sable.json");
    std::fs::write(&config, r#"{ "eager_function_bodies": true, "max_recursion_depth": 10 }"#)
        .unwrap();

    let config_arg = config.to_string_lossy().into_owned();
    let args = args(&["--config", &config_arg, "--max-depth", "20", "a.js"]);
    let options = args.parser_options().unwrap();
    assert!(options.eager_function_bodies);
    assert!(!options.strict);
    assert_eq!(options.max_recursion_depth, 20);
}

#[test]
fn test_bad_config_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("sable.json");
    std::fs::write(&config, r#"{ "strictt": true }"#).unwrap();

    let config_arg = config.to_string_lossy().into_owned();
    let error = args(&["--config", &config_arg, "a.js"])
        .parser_options()
        .unwrap_err();
    assert!(error.to_string().starts_with("invalid config"), "{error:#}");
}
