use std::{
    env,
    fs::read_to_string,
    io::IsTerminal,
    path::PathBuf,
    process::ExitCode,
    rc::Rc,
    sync::OnceLock,
    time::Instant,
};

use spreadc::{
    diagnostics::{render, render_internal, RenderOptions},
    errors::errors::Error,
    lexer::lexer::tokenize,
    parser::parser::parse,
    type_checker::type_checker::{type_check, CheckOptions},
};
use tracing::{info, warn};

const USAGE: &str = "usage: spreadc <file> [--no-color] [--werror]";

struct Args {
    path: PathBuf,
    color: bool,
    werror: bool,
}

fn parse_args(args: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut path = None;
    let mut color = RenderOptions::from_env().color;
    let mut werror = false;

    for arg in args {
        match arg.as_str() {
            "--no-color" => color = false,
            "--werror" => werror = true,
            flag if flag.starts_with("--") => return Err(format!("unknown flag `{}`", flag)),
            _ if path.is_some() => return Err(String::from("expected a single input file")),
            _ => path = Some(PathBuf::from(&arg)),
        }
    }

    match path {
        Some(path) => Ok(Args {
            path,
            color,
            werror,
        }),
        None => Err(String::from("no input file")),
    }
}

fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    static INITIALISED: OnceLock<()> = OnceLock::new();

    let _ = INITIALISED.get_or_init(|| {
        let use_ansi = env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal();
        let filter = EnvFilter::try_from_env("SPREADC_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

        let subscriber = fmt::fmt()
            .with_env_filter(filter)
            .with_ansi(use_ansi)
            .with_writer(std::io::stderr)
            .with_target(true)
            .compact()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

/// Internal compiler errors panic; show them like any other diagnostic.
fn install_panic_hook(options: RenderOptions) {
    std::panic::set_hook(Box::new(move |info| {
        let payload = info
            .payload()
            .downcast_ref::<String>()
            .map(String::as_str)
            .or_else(|| info.payload().downcast_ref::<&str>().copied())
            .unwrap_or("unknown panic");
        let message = payload
            .strip_prefix("internal compiler error: ")
            .unwrap_or(payload);
        let location = info
            .location()
            .map(|location| format!(" at {}:{}", location.file(), location.line()))
            .unwrap_or_default();
        eprint!("{}", render_internal(&format!("{}{}", message, location), &options));
    }));
}

fn report(error: &Error, source: &str, options: &RenderOptions) {
    eprintln!("{}", render(error, source, options));
}

fn main() -> ExitCode {
    init_logging();

    let args = match parse_args(env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("spreadc: {}\n{}", message, USAGE);
            return ExitCode::from(2);
        }
    };
    let render_options = RenderOptions { color: args.color };
    install_panic_hook(render_options);

    let source = match read_to_string(&args.path) {
        Ok(source) => source,
        Err(error) => {
            eprintln!("spreadc: cannot read `{}`: {}", args.path.display(), error);
            return ExitCode::from(2);
        }
    };
    let file_name = args
        .path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| args.path.display().to_string());

    let start = Instant::now();

    let tokens = match tokenize(source.clone(), Some(file_name.clone())) {
        Ok(tokens) => tokens,
        Err(error) => {
            report(&error, &source, &render_options);
            return ExitCode::from(1);
        }
    };
    info!(target: "lexer", elapsed = ?start.elapsed(), "tokenized");

    let parse_start = Instant::now();
    let (_, parsed) = parse(tokens, Rc::new(file_name));
    let mut program = match parsed {
        Ok(program) => program,
        Err(error) => {
            report(&error, &source, &render_options);
            return ExitCode::from(1);
        }
    };
    info!(target: "parser", elapsed = ?parse_start.elapsed(), "parsed");

    let options = CheckOptions {
        warnings_as_errors: args.werror,
    };
    let checked = type_check(&mut program, &options);

    for diagnostic in &checked.diagnostics {
        report(diagnostic, &source, &render_options);
    }
    info!(target: "typeck", elapsed = ?start.elapsed(), "finished");

    if checked.is_ok() {
        ExitCode::SUCCESS
    } else {
        warn!(target: "typeck", errors = checked.errors().count(), "type check failed");
        ExitCode::from(1)
    }
}
