//! avrpp – custom-assembly preprocessor for AVR devices (ATmega328P and similar)

use anyhow::{Context, Result};
use avrpp::{Report, Transpiler};
use clap::{ArgAction, Parser};
use log::{info, LevelFilter};
use std::{fs, path::Path, path::PathBuf};

/// CLI 옵션 정의
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Custom-assembly preprocessor for AVR devices (ATmega328P and similar)",
    arg_required_else_help = true
)]
struct Cli {
    /// 입력 소스 (`$` 문장 포함)
    #[arg(short = 'i', long = "in", value_name = "FILE")]
    input: PathBuf,

    /// 출력 ASM 파일
    #[arg(short = 'o', long = "out", value_name = "FILE")]
    output: PathBuf,

    /// 확장할 수 없는 문장에서 중단 (기본: 경고 후 생략)
    #[arg(long)]
    strict: bool,

    /// 통계 표 출력 안 함
    #[arg(short, long)]
    quiet: bool,

    /// 로그 상세도 (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    /* 1️⃣  소스 파일 읽기 */
    let src = fs::read_to_string(&cli.input)
        .with_context(|| format!("failed to read {}", cli.input.display()))?;
    info!("transpiling {}", cli.input.display());

    /* 2️⃣  줄 단위 분류 · 확장 */
    let output = Transpiler::default()
        .with_strict(cli.strict)
        .run(&src)
        .with_context(|| format!("failed to transpile {}", cli.input.display()))?;

    /* 3️⃣  결과 저장 (임시 파일 → rename) */
    write_atomic(&cli.output, &output.text)?;
    info!(
        "wrote {} ({} sentences expanded, {} skipped, {} hazards)",
        cli.output.display(),
        output.stats.transpiled_in - output.stats.skipped,
        output.stats.skipped,
        output.stats.hazards
    );

    if !cli.quiet {
        let report = Report::new(
            &cli.input,
            &cli.output,
            output.stats,
            src.len() as u64,
            output.text.len() as u64,
        );
        println!("{report}");
    }
    Ok(())
}

/// RUST_LOG 가 있으면 그것을 우선
fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

/// 같은 디렉터리의 임시 파일에 쓴 뒤 교체
fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let name = path
        .file_name()
        .with_context(|| format!("not a file path: {}", path.display()))?;
    let mut tmp_name = std::ffi::OsString::from(".");
    tmp_name.push(name);
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    fs::write(&tmp, contents).with_context(|| format!("failed to write {}", tmp.display()))?;
    if let Err(err) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(err).with_context(|| format!("failed to write {}", path.display()));
    }
    Ok(())
}
