use clap::{Parser, Subcommand};
use std::path::PathBuf;
use upload_guard_common::KeywordCheck;

#[derive(Parser)]
#[command(name = "upload-guard")]
#[command(about = "Excelアップロードの事前検証ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 設定ファイル（デフォルト: ~/.config/upload-guard/config.json）
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// ファイルを検証（アップロード前チェック）
    Check {
        /// 検証するExcelファイル
        #[arg(required = true)]
        file: PathBuf,

        /// カテゴリ（省略時は対話選択）
        #[arg(short, long)]
        category: Option<String>,

        /// 結果をJSONで出力
        #[arg(long)]
        json: bool,

        /// 必須シートの行数を表示
        #[arg(short, long)]
        summary: bool,
    },

    /// フォルダ内の全ファイルを検証
    CheckDir {
        /// 対象フォルダ
        #[arg(required = true)]
        folder: PathBuf,

        /// カテゴリ（省略時は対話選択）
        #[arg(short, long)]
        category: Option<String>,
    },

    /// 必須シートを解析し "Analysis" シートを書き出す
    Analyze {
        /// 解析するExcelファイル
        #[arg(required = true)]
        file: PathBuf,

        /// 出力ファイル（デフォルト: <元ファイル名>_analysis.xlsx）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 必須シートを含むテンプレートを生成
    Template {
        /// 出力ファイル
        #[arg(required = true)]
        output: PathBuf,

        /// カテゴリ（指定時はファイル名のキーワードも確認）
        #[arg(short, long)]
        category: Option<String>,
    },

    /// 設定を表示/編集
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// キーワードルールを追加/変更 (CAT=KEYWORD)
        #[arg(long, value_name = "CAT=KEYWORD")]
        set_keyword: Vec<String>,

        /// キーワードルールを削除
        #[arg(long, value_name = "CAT")]
        remove: Vec<String>,

        /// キーワード検査のタイミング (before-read/after-read)
        #[arg(long)]
        keyword_check: Option<KeywordCheck>,

        /// 既定値に戻す
        #[arg(long)]
        reset: bool,
    },
}
