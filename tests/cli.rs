use std::{
    fs,
    path::PathBuf,
    process::{Command, Output},
};

/// Directorio temporal propio de cada prueba, se borra al terminar.
struct Scratch(PathBuf);

impl Scratch {
    fn new(test: &str) -> Self {
        let dir = std::env::temp_dir().join(format!("slc-cli-{}-{}", std::process::id(), test));
        fs::create_dir_all(&dir).unwrap();
        Scratch(dir)
    }

    fn path(&self, name: &str) -> String {
        self.0.join(name).to_str().unwrap().to_owned()
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

fn slc(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_slc"))
        .args(args)
        .output()
        .expect("failed to run slc")
}

#[test]
fn compiles_to_file() {
    let scratch = Scratch::new("compiles_to_file");
    let (input, output) = (scratch.path("ok.sl"), scratch.path("ok.asm"));
    fs::write(&input, "int x;\nx = 5;\n").unwrap();

    let run = slc(&[&input, &output]);
    assert!(run.status.success());

    let stdout = String::from_utf8(run.stdout).unwrap();
    assert_eq!(
        stdout,
        format!("Compilation successful. Generated 3 assembly lines in {}\n", output)
    );

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "    MOV A, #5        ; load immediate\n    STORE A, [10]   ; x = A\n    HLT\n"
    );
}

#[test]
fn dash_writes_to_stdout() {
    let scratch = Scratch::new("dash_writes_to_stdout");
    let input = scratch.path("stdout.sl");
    fs::write(&input, "").unwrap();

    let run = slc(&[&input, "-"]);
    assert!(run.status.success());
    assert_eq!(run.stdout, b"    HLT\n");
}

#[test]
fn missing_arguments_is_usage_error() {
    let scratch = Scratch::new("missing_arguments_is_usage_error");
    let input = scratch.path("usage.sl");
    fs::write(&input, "int x;").unwrap();

    assert!(!slc(&[]).status.success());
    assert!(!slc(&[&input]).status.success());
}

#[test]
fn missing_input_fails() {
    let scratch = Scratch::new("missing_input_fails");
    let (input, output) = (scratch.path("does-not-exist.sl"), scratch.path("never.asm"));

    let run = slc(&[&input, &output]);
    assert!(!run.status.success());
    assert!(fs::metadata(&output).is_err());
}

#[test]
fn compile_error_leaves_no_output() {
    let scratch = Scratch::new("compile_error_leaves_no_output");
    let (input, output) = (scratch.path("bad.sl"), scratch.path("bad.asm"));
    fs::write(&input, "int x;\nx = y;\n").unwrap();

    let run = slc(&[&input, &output]);
    assert!(!run.status.success());
    assert!(fs::metadata(&output).is_err());

    let stderr = String::from_utf8(run.stderr).unwrap();
    assert!(stderr.contains("Semantic error: Symbol `y` is undefined"), "{}", stderr);
    assert!(run.stdout.is_empty());
}

#[test]
fn deep_nesting_is_reported() {
    let scratch = Scratch::new("deep_nesting_is_reported");
    let input = scratch.path("deep.sl");
    fs::write(&input, format!("{}{}", "{".repeat(50_000), "}".repeat(50_000))).unwrap();

    let run = slc(&[&input, "-"]);
    assert_eq!(run.status.code(), Some(1));

    let stderr = String::from_utf8(run.stderr).unwrap();
    assert!(stderr.contains("Syntax error: Blocks are nested deeper than"), "{}", stderr);
}
