use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use ttmp_meta::io::FsAssetReader;
use ttmp_meta::tables::MemoryTargets;
use ttmp_meta::{is_textools_metadata, MetaFile, ModEntry, ModTemplate, META_EXTENSION};

#[derive(Parser)]
#[command(name = "ttmp_meta")]
#[command(about = "读取 TexTools 模组包模板并应用 .meta 元数据补丁")]
#[command(version)]
struct Cli {
    /// 显示调试日志
    #[arg(short, long, global = true)]
    verbose: bool,

    /// 静默模式(仅输出错误)
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 解析元数据文件并输出摘要
    Inspect {
        /// 元数据文件的游戏路径（如 chara/equipment/e0001/model/c0101e0001_met.meta）
        target: String,

        /// 解包目录，游戏路径相对于该目录
        #[arg(short, long, default_value = ".")]
        root: PathBuf,
    },

    /// 将元数据应用到空白的内存目标表并输出结果
    Apply {
        /// 元数据文件的游戏路径
        target: String,

        /// 解包目录，游戏路径相对于该目录
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// 输出JSON文件路径
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 根据选择文档列出需要安装的条目
    Select {
        /// 模板文件路径（TTMPL.mpl）
        input: PathBuf,

        /// 选择文档 JSON 文件路径（缺省时全选）
        #[arg(short, long)]
        choices: Option<PathBuf>,

        /// 模板为旧式逐行格式
        #[arg(long)]
        legacy: bool,

        /// 输出JSON文件路径
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(&cli);

    match &cli.command {
        Command::Inspect { target, root } => handle_inspect(target, root),
        Command::Apply { target, root, output } => handle_apply(&cli, target, root, output.as_deref()),
        Command::Select {
            input,
            choices,
            legacy,
            output,
        } => handle_select(&cli, input, choices.as_deref(), *legacy, output.as_deref()),
    }
}

/// 初始化日志（RUST_LOG 优先）
fn init_logger(cli: &Cli) {
    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

/// 验证目标路径
fn validate_target(target: &str) -> Result<()> {
    if !is_textools_metadata(target) {
        bail!("目标路径必须是 .{} 文件: {}", META_EXTENSION, target);
    }
    Ok(())
}

/// 加载元数据文件
fn load_meta(target: &str, root: &Path) -> Result<MetaFile> {
    validate_target(target)?;
    let reader = FsAssetReader::new(root);
    MetaFile::load(&reader, target).with_context(|| format!("解析元数据失败: {}", target))
}

/// 处理元数据摘要输出
fn handle_inspect(target: &str, root: &Path) -> Result<()> {
    let meta = load_meta(target, root)?;
    let json = serde_json::to_string_pretty(&meta.summary()).context("序列化JSON失败")?;
    println!("{}", json);
    Ok(())
}

/// 处理元数据应用
fn handle_apply(cli: &Cli, target: &str, root: &Path, output: Option<&Path>) -> Result<()> {
    let meta = load_meta(target, root)?;

    let mut targets = MemoryTargets::new();
    meta.apply_all(&mut targets)
        .with_context(|| format!("应用元数据失败: {}", target))?;

    let json = serde_json::to_string_pretty(&targets).context("序列化JSON失败")?;
    write_output(&json, output)?;

    if !cli.quiet && output.is_some() {
        println!(
            "已应用 {} 个编辑块，修改了 {} 张表",
            meta.entries().len(),
            targets.variant_tables.len()
                + targets.deformer_tables.len()
                + targets.parameter_tables.len()
                + targets.skeleton_tables.len()
        );
    }

    Ok(())
}

/// 处理选项选择
fn handle_select(
    cli: &Cli,
    input: &Path,
    choices: Option<&Path>,
    legacy: bool,
    output: Option<&Path>,
) -> Result<()> {
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("读取模板文件失败: {:?}", input))?;
    let template = if legacy {
        ModTemplate::from_legacy_lines(&text)
    } else {
        ModTemplate::from_json_str(&text)
    }
    .with_context(|| format!("解析模板文件失败: {:?}", input))?;

    let choices: Option<serde_json::Value> = match choices {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("读取选择文档失败: {:?}", path))?;
            Some(serde_json::from_str(&content).with_context(|| format!("解析选择文档失败: {:?}", path))?)
        }
        None => None,
    };

    let entries = template
        .selected_entries(choices.as_ref())
        .context("选择条目失败")?;

    let json = serde_json::to_string_pretty(&entries).context("序列化JSON失败")?;
    write_output(&json, output)?;

    if !cli.quiet && output.is_some() {
        print_selection_summary(&template, &entries);
    }

    Ok(())
}

/// 打印选择摘要信息
fn print_selection_summary(template: &ModTemplate, entries: &[ModEntry]) {
    println!("模组包: {} ({})", template.name, template.version);
    println!("选中 {} 个条目", entries.len());

    for (i, entry) in entries.iter().take(3).enumerate() {
        println!("{}. [{}] {}", i + 1, entry.dat_file, entry.full_path);
    }
    if entries.len() > 3 {
        println!("... 还有 {} 个条目", entries.len() - 3);
    }
}

/// 输出到文件或标准输出
fn write_output(json: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, json).with_context(|| format!("写入文件失败: {:?}", path)),
        None => {
            println!("{}", json);
            Ok(())
        }
    }
}
