use pretty_assertions::assert_eq;

use super::*;

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_owned()).collect()
}

fn parse(list: &[&str]) -> (GenerateOptions, Vec<PathBuf>) {
    match parse_args(&args(list)) {
        Ok(parsed) => parsed,
        Err(err) => panic!("unexpected error: {err}"),
    }
}

#[test]
fn test_defaults() {
    let (options, inputs) = parse(&["decls"]);
    assert_eq!(inputs, vec![PathBuf::from("decls")]);
    assert_eq!(options.out_dir, PathBuf::from("generated"));
    assert_eq!(options.format, OutputFormat::Text);
    assert_eq!(options.diagnostics, DiagnosticFormat::Terminal);
    assert_eq!(options.default_contract, DEFAULT_CONTRACT);
    assert_eq!(options.error_limit, 0);
    assert!(options.parallel);
    assert_eq!(options.color, ColorMode::Auto);
}

#[test]
fn test_every_option() {
    let (options, inputs) = parse(&[
        "a.xom.json",
        "--out=build/gen",
        "--format=json",
        "--diagnostics=json",
        "--default-contract=Demo.Contract",
        "--error-limit=5",
        "--no-parallel",
        "--color=never",
        "more",
    ]);
    assert_eq!(
        inputs,
        vec![PathBuf::from("a.xom.json"), PathBuf::from("more")]
    );
    assert_eq!(options.out_dir, PathBuf::from("build/gen"));
    assert_eq!(options.format, OutputFormat::Json);
    assert_eq!(options.diagnostics, DiagnosticFormat::Json);
    assert_eq!(options.default_contract, "Demo.Contract");
    assert_eq!(options.error_limit, 5);
    assert!(!options.parallel);
    assert_eq!(options.color, ColorMode::Never);

    let analysis = options.analysis();
    assert_eq!(analysis.default_contract, "Demo.Contract");
    assert!(!analysis.parallel);
}

#[test]
fn test_out_takes_next_argument() {
    let (options, inputs) = parse(&["-o", "out", "decls"]);
    assert_eq!(options.out_dir, PathBuf::from("out"));
    assert_eq!(inputs, vec![PathBuf::from("decls")]);
}

#[test]
fn test_errors() {
    assert_eq!(
        parse_args(&args(&["decls", "--verbose"])).err(),
        Some(OptionsError::Unknown("--verbose".to_owned()))
    );
    assert_eq!(
        parse_args(&args(&["decls", "--out"])).err(),
        Some(OptionsError::MissingValue("out"))
    );
    assert_eq!(
        parse_args(&args(&["decls", "--format=yaml"])).err(),
        Some(OptionsError::InvalidValue {
            option: "format",
            value: "yaml".to_owned(),
            expected: "text or json",
        })
    );
    assert!(matches!(
        parse_args(&args(&["decls", "--error-limit=-1"])),
        Err(OptionsError::InvalidValue {
            option: "error-limit",
            ..
        })
    ));
    assert_eq!(
        parse_args(&args(&["--no-parallel"])).err(),
        Some(OptionsError::NoInputs)
    );
}
