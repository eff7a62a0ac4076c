//! 运行日志管理命令
//!
//! 每次工作流运行在日志目录下生成一份独立文件，
//! 这里提供最新一份的定位、目录统计与过期清理。

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};

use crate::config::CliConfig;
use crate::LogsAction;

/// 一份运行日志的元数据
struct LogFile {
    path: PathBuf,
    modified: SystemTime,
    size_bytes: u64,
}

impl LogFile {
    fn age_hours(&self) -> f64 {
        self.modified
            .elapsed()
            .map(|d| d.as_secs_f64() / 3600.0)
            .unwrap_or(0.0)
    }

    fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / (1024.0 * 1024.0)
    }
}

/// 列出日志目录下的全部 .log 文件
fn collect_logs(log_dir: &str) -> Result<Vec<LogFile>> {
    let dir = Path::new(log_dir);
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut logs = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("读取日志目录失败: {}", log_dir))? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("log") {
            continue;
        }
        let metadata = entry.metadata()?;
        logs.push(LogFile {
            path,
            modified: metadata.modified()?,
            size_bytes: metadata.len(),
        });
    }
    Ok(logs)
}

pub fn handle(action: LogsAction) -> Result<()> {
    let config = CliConfig::load()?;
    let log_dir = &config.log_dir;

    match action {
        LogsAction::Latest => {
            let logs = collect_logs(log_dir)?;
            match logs.into_iter().max_by_key(|l| l.modified) {
                Some(latest) => {
                    let modified: DateTime<Local> = latest.modified.into();
                    println!("{}", latest.path.display());
                    println!(
                        "  修改时间: {}  大小: {:.2} MB",
                        modified.format("%Y-%m-%d %H:%M:%S"),
                        latest.size_mb()
                    );
                }
                None => println!("日志目录 {} 下没有运行日志", log_dir),
            }
        }
        LogsAction::Stats { hours } => {
            let logs = collect_logs(log_dir)?;
            let old: Vec<_> = logs
                .iter()
                .filter(|l| l.age_hours() > hours as f64)
                .collect();
            let old_size_mb: f64 = old.iter().map(|l| l.size_mb()).sum();
            let oldest_hours = old
                .iter()
                .map(|l| l.age_hours())
                .fold(0.0_f64, f64::max);

            println!("日志目录: {}", log_dir);
            println!("  日志总数: {}", logs.len());
            println!("  超过 {} 小时的: {}", hours, old.len());
            println!("  可清理空间: {:.2} MB", old_size_mb);
            if !old.is_empty() {
                println!("  最旧日志: {:.1} 小时", oldest_hours);
            }
        }
        LogsAction::Cleanup { hours } => {
            let logs = collect_logs(log_dir)?;
            let mut old: Vec<_> = logs
                .into_iter()
                .filter(|l| l.age_hours() > hours as f64)
                .collect();
            // 先删最旧的
            old.sort_by(|a, b| {
                b.age_hours()
                    .partial_cmp(&a.age_hours())
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            if old.is_empty() {
                println!("没有超过 {} 小时的日志", hours);
                return Ok(());
            }

            let mut deleted = 0;
            let mut failed = 0;
            let mut freed_mb = 0.0;
            for log in old {
                match fs::remove_file(&log.path) {
                    Ok(()) => {
                        println!(
                            "已删除 {} ({:.1} 小时)",
                            log.path.display(),
                            log.age_hours()
                        );
                        deleted += 1;
                        freed_mb += log.size_mb();
                    }
                    Err(e) => {
                        eprintln!("删除 {} 失败: {}", log.path.display(), e);
                        failed += 1;
                    }
                }
            }
            println!(
                "清理完成: 删除 {} 份, 失败 {} 份, 释放 {:.2} MB",
                deleted, failed, freed_mb
            );
        }
    }

    Ok(())
}
