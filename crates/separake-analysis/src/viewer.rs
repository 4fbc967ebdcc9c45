//! 保存した図を OS 既定のビューアで開く

use std::path::Path;
use std::process::{Command, Stdio};

fn viewer_command(path: &Path) -> Command {
    if cfg!(target_os = "macos") {
        let mut cmd = Command::new("open");
        cmd.arg(path);
        cmd
    } else if cfg!(target_os = "windows") {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", "start", ""]).arg(path);
        cmd
    } else {
        let mut cmd = Command::new("xdg-open");
        cmd.arg(path);
        cmd
    }
}

/// 図を1枚ずつビューアに渡す
///
/// 起動に失敗しても警告を出すだけで処理は続ける。開けた枚数を返す。
pub fn show_figures<'a, I>(paths: I) -> usize
where
    I: IntoIterator<Item = &'a Path>,
{
    let mut opened = 0;
    for path in paths {
        let spawned = viewer_command(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        match spawned {
            Ok(_) => opened += 1,
            Err(e) => log::warn!("could not open {}: {}", path.display(), e),
        }
    }
    opened
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewer_command_targets_path() {
        let cmd = viewer_command(Path::new("figures/a.svg"));
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(args.last().map(|a| a.to_string_lossy().into_owned()), Some("figures/a.svg".into()));
    }

    #[test]
    fn test_show_nothing() {
        assert_eq!(show_figures(std::iter::empty()), 0);
    }
}
