//! 차트 분석 대시보드 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 추천 JSON 파일을 레이더로 출력
//! chartwise radar --file data/recommendation.json
//!
//! # 패턴 JSON 파일에 확인 파이프라인 실행 (신뢰도 60% 이상, 겹침 10%)
//! chartwise confirm --file data/patterns.json --min-confidence 60 --overlap 10
//!
//! # 백엔드에서 종목 패턴 조회
//! chartwise show --stock 5930 --days 180
//!
//! # 패턴 감지 실행 후 결과 출력
//! chartwise detect --stock 5930 --exclude "Rounding Top" --exclude "Rounding Bottom"
//!
//! # 패턴 삭제
//! chartwise delete --stock 5930 --pattern 42
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use chartwise_cli::commands::{offline, render, stock, DetectionArgs};
use chartwise_core::{init_logging, AppConfig, LogConfig};
use clap::{Parser, Subcommand};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "chartwise")]
#[command(about = "Chart analysis dashboard CLI - 신호 레이더 및 다중 타임프레임 패턴 확인", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 (없으면 기본값과 환경 변수 사용)
    #[arg(short, long, global = true, default_value = "config/default.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 추천 JSON 파일을 레이더 모델로 출력
    Radar {
        /// 추천 파일 (`null`이면 데이터 없음)
        #[arg(short, long)]
        file: PathBuf,
    },

    /// 패턴 JSON 파일에 확인 파이프라인 실행
    Confirm {
        /// 패턴 파일 (배열 또는 {"patterns": [...]})
        #[arg(short, long)]
        file: PathBuf,

        #[command(flatten)]
        detection: DetectionArgs,

        /// JSON으로 출력
        #[arg(long)]
        json: bool,
    },

    /// 종목의 저장된 패턴과 레이더 조회
    Show {
        /// 종목 ID
        #[arg(short, long)]
        stock: i64,

        /// 분석 기간 (일)
        #[arg(short, long)]
        days: Option<u32>,
    },

    /// 패턴 감지 실행
    Detect {
        /// 종목 ID
        #[arg(short, long)]
        stock: i64,

        #[command(flatten)]
        detection: DetectionArgs,
    },

    /// 패턴 삭제
    Delete {
        /// 종목 ID
        #[arg(short, long)]
        stock: i64,

        /// 패턴 ID
        #[arg(short, long)]
        pattern: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config: {}", cli.config.display()))?;

    init_logging(LogConfig::from_settings(&config.logging))
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!(config = %cli.config.display(), backend = %config.backend.base_url, "chartwise 시작");

    let result = run(cli.command, &config).await;
    if let Err(e) = &result {
        error!("{:#}", e);
    }
    result
}

async fn run(command: Commands, config: &AppConfig) -> Result<()> {
    match command {
        Commands::Radar { file } => {
            let radar = offline::run_radar(&file)?;
            println!("{}", render::format_radar(radar.as_ref()));
        }

        Commands::Confirm {
            file,
            detection,
            json,
        } => {
            let settings = detection.apply(&config.detection);
            let report = offline::run_confirm(&file, &settings)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("입력: {}\n", render::format_summary(&report.input));
                println!("{}", render::format_patterns(&report.patterns, None));
                println!(
                    "\nChart Pattern 신호: {} ({:.0}%)",
                    report.chart_pattern.label(),
                    report.chart_pattern.confidence * 100.0
                );
            }
        }

        Commands::Show { stock: stock_id, days } => {
            let snapshot = stock::show(config, stock_id, days.or(config.detection.days)).await?;
            println!("{}", render::format_snapshot(&snapshot));
        }

        Commands::Detect {
            stock: stock_id,
            detection,
        } => {
            let settings = detection.apply(&config.detection);
            match stock::detect(config, stock_id, &settings).await? {
                Some(snapshot) => println!("{}", render::format_snapshot(&snapshot)),
                None => println!("감지가 중단되었습니다."),
            }
        }

        Commands::Delete {
            stock: stock_id,
            pattern,
        } => {
            let snapshot = stock::delete(config, stock_id, pattern).await?;
            println!("패턴 {} 삭제됨\n", pattern);
            println!("{}", render::format_snapshot(&snapshot));
        }
    }

    Ok(())
}
