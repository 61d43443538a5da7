use clap::Parser;
use tracing_subscriber::EnvFilter;
use upload_guard::{analyze, category_selector, check, cli, config, error, template};
use upload_guard_common::FormGuard;
use cli::{Cli, Commands};
use config::Config;
use error::{GuardError, Result};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = match cli.config {
        Some(path) => path,
        None => Config::config_path()?,
    };
    let config = Config::load_from(&config_path)?;
    let guard = FormGuard::new(config.rules.clone());

    match cli.command {
        Commands::Check { file, category, json, summary } => {
            let category = category_selector::resolve_category(guard.rules(), category)?;

            let host = if json { check::ConsoleHost::quiet() } else { check::ConsoleHost::default() };
            if !json {
                println!("📄 upload-guard - ファイル検証\n");
                println!("  ファイル: {}", file.display());
                println!("  カテゴリ: {}\n", category);
            }

            let result = check::check_file(&guard, &host, &file, &category).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else if host.accepted() {
                println!("✔ シート: {}", result.sheet_names.join(", "));
                println!("\n✅ アップロード可能です");
            }

            if summary && host.accepted() {
                println!("\n必須シートの行数:");
                for sheet in check::summarize_file(&guard, &file).await? {
                    println!("  {}: {}行 (mean/sd {}行を除外)", sheet.name, sheet.data_rows, sheet.summary_rows);
                }
            }

            if !host.accepted() {
                return Err(GuardError::Rejected(1));
            }
        }

        Commands::CheckDir { folder, category } => {
            let category = category_selector::resolve_category(guard.rules(), category)?;
            println!("📁 upload-guard - 一括検証 ({})\n", category);

            let report = check::check_dir(&guard, &folder, &category).await?;
            println!("\n合計 {}件: 成功 {}件 / 失敗 {}件", report.total(), report.passed.len(), report.failed.len());

            if !report.failed.is_empty() {
                return Err(GuardError::Rejected(report.failed.len()));
            }
        }

        Commands::Analyze { file, output } => {
            let output = output.unwrap_or_else(|| analyze::default_output_path(&file));
            println!("📊 upload-guard - 解析\n");

            let table = analyze::analyze_file(&guard, &file).await?;
            analyze::write_analysis(&table, &file, &output)?;

            println!("  行数: {}", table.rows.len());
            println!("  pHL_VL2_BL1 傾き: {}", format_slope(table.phl_slope));
            println!("  yemk_vl2_bl1 傾き: {}", format_slope(table.yemk_slope));
            println!("\n✔ 解析シートを作成: {}", output.display());
        }

        Commands::Template { output, category } => {
            template::generate_template(&guard, &output, category.as_deref())?;
            println!("✔ テンプレートを作成: {}", output.display());
        }

        Commands::Config { show, set_keyword, remove, keyword_check, reset } => {
            let mut config = if reset { Config::default() } else { config };
            let changed = reset || !set_keyword.is_empty() || !remove.is_empty() || keyword_check.is_some();

            for spec in &set_keyword {
                config.set_keyword(spec)?;
            }
            for category in &remove {
                config.remove_keyword(category)?;
            }
            if let Some(timing) = keyword_check {
                config.rules.keyword_check = timing;
            }

            if changed {
                config.save_to(&config_path)?;
                println!("✔ 設定を保存しました: {}", config_path.display());
            }

            if show || !changed {
                println!("設定:");
                println!("  拡張子: {}", config.rules.accepted_extensions.join(", "));
                println!("  必須シート: {}", config.rules.required_sheets.names().join(", "));
                println!("  キーワード検査: {}", config.rules.keyword_check);
                println!("  キーワード:");
                for rule in &config.rules.keyword_rules {
                    println!("    {} → {}", rule.category, rule.keyword);
                }
            }
        }
    }

    Ok(())
}

fn format_slope(slope: Option<f64>) -> String {
    slope.map_or_else(|| "-".to_string(), |s| format!("{:.6}", s))
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
