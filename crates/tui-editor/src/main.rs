//! TUI 二进制代码块演示
//!
//! 使用 crossterm 和 ratatui 构建的终端富文本编辑器，加载内置示例文档并启用
//! `richtext-binary` 扩展。
//!
//! # 用法
//!
//! ```bash
//! cargo run -p tui-editor
//! cargo run -p tui-editor -- --config binary.json --log-dir /tmp
//! ```
//!
//! # 快捷键
//!
//! - 方向键 / Home / End: 移动光标
//! - Tab / Shift+Tab: 跳到下一个 / 上一个二进制块
//! - Ctrl+B: 切换二进制代码块
//! - Ctrl+O: 切换引用，Ctrl+L / Ctrl+N: 切换无序 / 有序列表
//! - Ctrl+E / Ctrl+R: 居中 / 右对齐
//! - Alt+0 / Alt+1: 向当前二进制块末尾追加数字
//! - Shift+←/→: 扩展选区
//! - Alt+B / Alt+I / Alt+U / Alt+`: 粗体 / 斜体 / 下划线 / 代码
//! - Alt+H / Alt+J: 一级 / 二级标题
//! - 在只含 ```` ``` ```` 的段落里按空格: 转为二进制代码块
//! - Backspace/Delete: 删除字符，Enter: 拆分块
//! - Ctrl+X: 退出
//!
//! 鼠标悬停在二进制块上会显示解码结果，点击块上方的 `[1]` `[0]` 按钮追加数字。

mod app;
mod logging;
mod view;

use std::io::{self, stdout};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{
        self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
        Event,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use richtext_binary::BinaryBlockConfig;
use tracing::info;

use crate::app::App;

#[derive(Parser, Debug)]
#[command(name = "tui-editor", version, about = "二进制代码块演示编辑器")]
struct CliArgs {
    /// JSON 配置文件
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// 日志目录
    #[arg(long, value_name = "DIR", default_value = ".")]
    log_dir: PathBuf,

    /// 打印生效的配置后退出
    #[arg(long)]
    print_config: bool,
}

fn main() -> io::Result<()> {
    let args = CliArgs::parse();

    let config = match &args.config {
        Some(path) => BinaryBlockConfig::from_json_file(path).map_err(io::Error::other)?,
        None => BinaryBlockConfig::default(),
    };
    if args.print_config {
        let json = serde_json::to_string_pretty(&config).map_err(io::Error::other)?;
        println!("{json}");
        return Ok(());
    }

    // 终端被占用，日志只能写文件
    if let Err(err) = logging::init(&args.log_dir) {
        eprintln!("警告: 无法初始化日志: {err}");
    }
    info!(config = ?args.config, "tui-editor starting");

    // 创建应用
    let mut app = App::new(config).map_err(io::Error::other)?;

    // 设置终端
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // 主循环
    let result = run_app(&mut terminal, &mut app);

    // 恢复终端
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("错误: {}", err);
    }
    info!("tui-editor stopped");

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| app.render(f))?;

        if app.should_quit() {
            break;
        }

        // 处理事件
        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) => {
                    app.handle_key_event(key);
                }
                Event::Mouse(mouse) => {
                    app.handle_mouse_event(mouse);
                }
                Event::Paste(text) => {
                    app.handle_paste(text);
                }
                Event::Resize(_, _) => {
                    // 下一帧 render 会按新宽度重新测量
                }
                _ => {}
            }
        }
    }

    Ok(())
}
