//! 编辑器应用状态与事件处理

use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph},
};
use richtext_binary::{
    BinaryBlockConfig, BinaryBlocks, Digit, EventDisposition, Measurement, MeasurementProvider,
    PresenterEvent, digit_count, sample_document,
};
use richtext_core::{
    Alignment, BlockKind, CoreError, Document, Editor, Element, Mark, Node, NodeId, Operation,
    Path, Point, Selection,
};
use tracing::{debug, warn};
use unicode_width::UnicodeWidthStr;

use crate::view::{self, BlockInput, BlockRender};

/// 以终端单元格为单位测量二进制块
pub struct CellMetrics<'a> {
    doc: &'a Document,
    container_width: u16,
}

impl<'a> CellMetrics<'a> {
    pub fn new(doc: &'a Document, container_width: u16) -> Self {
        Self {
            doc,
            container_width,
        }
    }
}

impl MeasurementProvider for CellMetrics<'_> {
    fn measure(&self, block: NodeId) -> Option<Measurement> {
        let (_, element) = self.doc.element_by_id(block)?;
        let text = element.text();
        Some(Measurement {
            container_width: f64::from(self.container_width),
            rendered_text_width: text.width() as f64,
            digit_count: digit_count(&text),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HitTarget {
    /// 二进制块正文
    Content(NodeId),
    /// 二进制块的 0/1 按钮
    Control(NodeId, Digit),
    /// 其他块
    Text(NodeId),
}

#[derive(Debug, Clone, Copy)]
struct Hit {
    area: Rect,
    target: HitTarget,
}

/// 文档中所有文本节点及其长度（文档顺序）
fn text_points(doc: &Document) -> Vec<(Path, usize)> {
    doc.descendants()
        .filter_map(|(path, node)| node.as_text().map(|span| (path, span.char_len())))
        .collect()
}

/// 提示框位置：指针下方一行，避免挡住指针所在的数字；始终留在屏幕内
fn tooltip_area(screen: Rect, x: f64, y: f64, text_width: u16) -> Rect {
    let width = text_width.min(screen.width);
    let x = (x as u16).min(screen.width.saturating_sub(width));
    let y = (y as u16)
        .saturating_add(1)
        .min(screen.height.saturating_sub(1));
    Rect::new(x, y, width, 1)
}

fn printable(text: &str) -> String {
    text.chars()
        .map(|ch| if ch.is_control() { '·' } else { ch })
        .collect()
}

pub struct App {
    editor: Editor,
    blocks: BinaryBlocks,
    should_quit: bool,
    status_message: String,
    /// 编辑区内宽（不含边框）
    content_width: u16,
    scroll_top: usize,
    /// 光标所在的二进制块（即获得焦点的块）
    focused: Option<NodeId>,
    hovered: Option<NodeId>,
    /// 按下但尚未松开的按钮
    pressed: Option<(NodeId, Digit)>,
    /// 上一帧的鼠标命中区域
    hits: Vec<Hit>,
}

impl App {
    pub fn new(config: BinaryBlockConfig) -> Result<Self, CoreError> {
        let mut editor = Editor::new(sample_document());
        let mut blocks = BinaryBlocks::new(config);
        blocks.install(&mut editor)?;
        if let Some(start) = editor.document().start_point(&Path::root()) {
            editor.set_selection(Selection::collapsed(start))?;
        }

        let mut app = Self {
            editor,
            blocks,
            should_quit: false,
            status_message: String::new(),
            content_width: 0,
            scroll_top: 0,
            focused: None,
            hovered: None,
            pressed: None,
            hits: Vec::new(),
        };
        app.after_edit();
        Ok(app)
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// 同步二进制块展示状态，并让焦点跟随光标
    fn after_edit(&mut self) {
        let metrics = CellMetrics::new(self.editor.document(), self.content_width);
        let report = self.blocks.sync(&self.editor, &metrics);
        if !report.is_empty() {
            debug!(?report, "binary blocks synced");
        }
        if self.hovered.is_some_and(|id| self.blocks.presenter(id).is_none()) {
            self.hovered = None;
        }
        self.sync_focus();
    }

    fn finish(&mut self, result: Result<bool, CoreError>) {
        if let Err(err) = result {
            warn!(error = %err, "edit failed");
            self.status_message = format!("编辑失败: {err}");
        }
        self.after_edit();
    }

    fn deliver(&mut self, block: NodeId, event: PresenterEvent) -> EventDisposition {
        match self.blocks.handle_event(&mut self.editor, block, event) {
            Ok(disposition) => disposition,
            Err(err) => {
                warn!(block = %block, error = %err, "binary block event failed");
                self.status_message = format!("操作失败: {err}");
                EventDisposition::Ignored
            }
        }
    }

    fn caret(&self) -> Option<Point> {
        self.editor.selection().map(|selection| selection.focus.clone())
    }

    fn caret_block(&self) -> Option<NodeId> {
        let caret = self.caret()?;
        let (_, element) = self.editor.document().enclosing_block(&caret.path)?;
        Some(element.id)
    }

    fn sync_focus(&mut self) {
        let target = self
            .caret_block()
            .filter(|id| self.blocks.presenter(*id).is_some());
        if target == self.focused {
            return;
        }
        if let Some(old) = self.focused.take()
            && self.blocks.presenter(old).is_some()
        {
            self.deliver(old, PresenterEvent::Blur);
        }
        if let Some(new) = target {
            self.deliver(new, PresenterEvent::Focus);
            self.focused = Some(new);
        }
    }

    fn on_resize(&mut self, width: u16) {
        self.content_width = width;
        let metrics = CellMetrics::new(self.editor.document(), width);
        self.blocks.on_resize(&metrics);
        debug!(width, "viewport resized");
    }

    fn set_caret(&mut self, point: Point) -> Result<bool, CoreError> {
        self.editor.set_selection(Selection::collapsed(point))?;
        Ok(false)
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        self.status_message.clear();

        let result = match (key.modifiers, key.code) {
            // Ctrl+X / Ctrl+Q: 退出
            (KeyModifiers::CONTROL, KeyCode::Char('x' | 'q')) => {
                self.should_quit = true;
                Ok(false)
            }
            // Ctrl+B: 切换二进制代码块
            (KeyModifiers::CONTROL, KeyCode::Char('b')) => {
                self.editor.toggle_block(BlockKind::BinaryCode)
            }
            (KeyModifiers::CONTROL, KeyCode::Char('o')) => {
                self.editor.toggle_block(BlockKind::BlockQuote)
            }
            (KeyModifiers::CONTROL, KeyCode::Char('l')) => {
                self.editor.toggle_block(BlockKind::BulletedList)
            }
            (KeyModifiers::CONTROL, KeyCode::Char('n')) => {
                self.editor.toggle_block(BlockKind::NumberedList)
            }
            (KeyModifiers::CONTROL, KeyCode::Char('e')) => {
                self.editor.toggle_alignment(Alignment::Center)
            }
            (KeyModifiers::CONTROL, KeyCode::Char('r')) => {
                self.editor.toggle_alignment(Alignment::Right)
            }
            (KeyModifiers::ALT, KeyCode::Char('b')) => self.editor.toggle_mark(Mark::Bold),
            (KeyModifiers::ALT, KeyCode::Char('i')) => self.editor.toggle_mark(Mark::Italic),
            (KeyModifiers::ALT, KeyCode::Char('u')) => self.editor.toggle_mark(Mark::Underline),
            (KeyModifiers::ALT, KeyCode::Char('`')) => self.editor.toggle_mark(Mark::Code),
            (KeyModifiers::ALT, KeyCode::Char('h')) => {
                self.editor.toggle_block(BlockKind::HeadingOne)
            }
            (KeyModifiers::ALT, KeyCode::Char('j')) => {
                self.editor.toggle_block(BlockKind::HeadingTwo)
            }
            // Alt+0 / Alt+1: 当前块的按钮
            (KeyModifiers::ALT, KeyCode::Char(ch @ ('0' | '1'))) => {
                self.press_focused_control(ch);
                Ok(true)
            }
            (_, KeyCode::Tab) => self.focus_next_binary(true),
            (_, KeyCode::BackTab) => self.focus_next_binary(false),
            (KeyModifiers::SHIFT, KeyCode::Left) => self.move_horizontal(false, true),
            (KeyModifiers::SHIFT, KeyCode::Right) => self.move_horizontal(true, true),
            (_, KeyCode::Left) => self.move_horizontal(false, false),
            (_, KeyCode::Right) => self.move_horizontal(true, false),
            (_, KeyCode::Up) => self.move_vertical(false),
            (_, KeyCode::Down) => self.move_vertical(true),
            (_, KeyCode::Home) => self.move_to_block_edge(false),
            (_, KeyCode::End) => self.move_to_block_edge(true),
            (_, KeyCode::Backspace) => self.backspace(),
            (_, KeyCode::Delete) => self.delete_forward(),
            (_, KeyCode::Enter) => self.split_block(),
            (modifiers, KeyCode::Char(ch))
                if !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.type_char(ch)
            }
            _ => Ok(false),
        };
        self.finish(result);
    }

    pub fn handle_paste(&mut self, text: String) {
        let text = text.replace("\r\n", " ").replace('\n', " ");
        let result = self.editor.insert_text(&text);
        self.finish(result);
    }

    pub fn handle_mouse_event(&mut self, mouse: MouseEvent) {
        let (x, y) = (mouse.column, mouse.row);
        let target = self.hit(x, y);
        match mouse.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => self.update_hover(target, x, y),
            MouseEventKind::Down(MouseButton::Left) => {
                self.update_hover(target, x, y);
                match target {
                    Some(HitTarget::Control(block, digit)) => {
                        // 按钮不抢焦点，光标保持原位
                        let disposition =
                            self.deliver(block, PresenterEvent::ControlPointerDown(digit));
                        if disposition == EventDisposition::PreventDefault {
                            self.pressed = Some((block, digit));
                        }
                    }
                    Some(HitTarget::Content(block) | HitTarget::Text(block)) => {
                        let result = match self.editor.document().path_of(block) {
                            Some(path) => match self.editor.document().end_point(&path) {
                                Some(end) => self.set_caret(end),
                                None => Ok(false),
                            },
                            None => Ok(false),
                        };
                        self.finish(result);
                    }
                    None => {}
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if let Some((block, digit)) = self.pressed.take()
                    && target == Some(HitTarget::Control(block, digit))
                {
                    self.deliver(block, PresenterEvent::ControlClick(digit));
                    self.after_edit();
                }
            }
            _ => {}
        }
    }

    fn hit(&self, x: u16, y: u16) -> Option<HitTarget> {
        self.hits
            .iter()
            .rev()
            .find(|hit| {
                x >= hit.area.x
                    && x < hit.area.x + hit.area.width
                    && y >= hit.area.y
                    && y < hit.area.y + hit.area.height
            })
            .map(|hit| hit.target)
    }

    fn update_hover(&mut self, target: Option<HitTarget>, x: u16, y: u16) {
        let over = match target {
            Some(HitTarget::Content(id)) => Some(id),
            _ => None,
        };
        let (x, y) = (f64::from(x), f64::from(y));
        if over == self.hovered {
            if let Some(id) = over {
                self.deliver(id, PresenterEvent::PointerMove { x, y });
            }
            return;
        }
        if let Some(old) = self.hovered.take() {
            self.deliver(old, PresenterEvent::PointerLeave);
        }
        if let Some(new) = over {
            self.deliver(new, PresenterEvent::PointerEnter { x, y });
            self.hovered = Some(new);
        }
    }

    fn press_focused_control(&mut self, ch: char) {
        let (Some(block), Some(digit)) = (self.focused, Digit::from_char(ch)) else {
            self.status_message = "光标不在二进制块中".to_string();
            return;
        };
        if self.deliver(block, PresenterEvent::ControlPointerDown(digit))
            == EventDisposition::PreventDefault
        {
            self.deliver(block, PresenterEvent::ControlClick(digit));
        }
    }

    fn type_char(&mut self, ch: char) -> Result<bool, CoreError> {
        if ch == ' ' && self.blocks.handle_space(&mut self.editor)? {
            self.status_message = "已创建二进制代码块".to_string();
            return Ok(true);
        }
        let mut buf = [0; 4];
        self.editor.insert_text(ch.encode_utf8(&mut buf))
    }

    fn focus_next_binary(&mut self, forward: bool) -> Result<bool, CoreError> {
        let doc = self.editor.document();
        let binary: Vec<Path> = doc
            .elements_matching(|element| element.kind == BlockKind::BinaryCode)
            .into_iter()
            .map(|(path, _)| path)
            .collect();
        if binary.is_empty() {
            return Ok(false);
        }
        let current = self
            .focused
            .and_then(|id| doc.path_of(id))
            .and_then(|path| binary.iter().position(|p| *p == path));
        let next = match (current, forward) {
            (Some(i), true) => (i + 1) % binary.len(),
            (Some(i), false) => (i + binary.len() - 1) % binary.len(),
            (None, true) => 0,
            (None, false) => binary.len() - 1,
        };
        match doc.end_point(&binary[next]) {
            Some(end) => self.set_caret(end),
            None => Ok(false),
        }
    }

    /// 左右移动光标；`extend` 时保留锚点、扩展选区
    fn move_horizontal(&mut self, forward: bool, extend: bool) -> Result<bool, CoreError> {
        let anchor = self.editor.selection().map(|selection| selection.anchor.clone());
        let Some(caret) = self.caret() else {
            return Ok(false);
        };
        let texts = text_points(self.editor.document());
        let Some(index) = texts.iter().position(|(path, _)| *path == caret.path) else {
            return Ok(false);
        };
        let len = texts[index].1;
        let next = if forward {
            if caret.offset < len {
                Some(Point::new(caret.path.clone(), caret.offset + 1))
            } else {
                texts.get(index + 1).map(|(path, _)| Point::new(path.clone(), 0))
            }
        } else if caret.offset > 0 {
            Some(Point::new(caret.path.clone(), caret.offset - 1))
        } else {
            index
                .checked_sub(1)
                .and_then(|i| texts.get(i))
                .map(|(path, len)| Point::new(path.clone(), *len))
        };
        match (next, anchor) {
            (Some(point), Some(anchor)) if extend => {
                self.editor.set_selection(Selection::new(anchor, point))?;
                Ok(false)
            }
            (Some(point), _) => self.set_caret(point),
            (None, _) => Ok(false),
        }
    }

    fn move_vertical(&mut self, down: bool) -> Result<bool, CoreError> {
        let Some(caret) = self.caret() else {
            return Ok(false);
        };
        let doc = self.editor.document();
        let blocks: Vec<Path> = doc.leaf_blocks().into_iter().map(|(path, _)| path).collect();
        let Some(index) = blocks.iter().position(|path| path.is_ancestor_of(&caret.path)) else {
            return Ok(false);
        };
        let target = if down {
            blocks.get(index + 1)
        } else {
            index.checked_sub(1).and_then(|i| blocks.get(i))
        };
        let Some(start) = target.and_then(|path| doc.start_point(path)) else {
            return Ok(false);
        };
        let len = doc.text(&start.path).map_or(0, |span| span.char_len());
        let point = Point::new(start.path, caret.offset.min(len));
        self.set_caret(point)
    }

    fn move_to_block_edge(&mut self, end: bool) -> Result<bool, CoreError> {
        let Some(caret) = self.caret() else {
            return Ok(false);
        };
        let doc = self.editor.document();
        let Some((path, _)) = doc.enclosing_block(&caret.path) else {
            return Ok(false);
        };
        let point = if end {
            doc.end_point(&path)
        } else {
            doc.start_point(&path)
        };
        match point {
            Some(point) => self.set_caret(point),
            None => Ok(false),
        }
    }

    fn backspace(&mut self) -> Result<bool, CoreError> {
        let Some(selection) = self.editor.selection().cloned() else {
            return Ok(false);
        };
        if !selection.is_collapsed() {
            return self.editor.insert_text("");
        }
        let caret = selection.focus;
        if caret.offset > 0 {
            return self
                .editor
                .delete_range(&caret.path, caret.offset - 1..caret.offset);
        }

        let doc = self.editor.document();
        let Some((block_path, block)) = doc.enclosing_block(&caret.path) else {
            return Ok(false);
        };
        let block_is_empty = block.text().is_empty();
        let has_other_blocks = doc.leaf_blocks().len() > 1;
        let previous = text_points(doc)
            .into_iter()
            .take_while(|(path, _)| *path < caret.path)
            .last();
        match previous {
            // 同一块内的前一个文本节点
            Some((path, len)) if block_path.is_ancestor_of(&path) && len > 0 => {
                self.editor.delete_range(&path, len - 1..len)
            }
            _ if block_is_empty && has_other_blocks => self.editor.remove_node(&block_path),
            _ => Ok(false),
        }
    }

    fn delete_forward(&mut self) -> Result<bool, CoreError> {
        let Some(caret) = self.caret() else {
            return Ok(false);
        };
        let len = self
            .editor
            .document()
            .text(&caret.path)
            .map_or(0, |span| span.char_len());
        if caret.offset >= len {
            return Ok(false);
        }
        self.editor
            .delete_range(&caret.path, caret.offset..caret.offset + 1)
    }

    /// Enter: 在光标处把当前块一分为二
    fn split_block(&mut self) -> Result<bool, CoreError> {
        if self
            .editor
            .selection()
            .is_some_and(|selection| !selection.is_collapsed())
        {
            self.editor.insert_text("")?;
        }
        let Some(caret) = self.caret() else {
            return Ok(false);
        };
        let doc = self.editor.document();
        let Some((block_path, block)) = doc.enclosing_block(&caret.path) else {
            return Ok(false);
        };
        let Some(new_path) = block_path.next_sibling() else {
            return Ok(false);
        };

        let mut moved = Vec::new();
        let mut removals = Vec::new();
        for (text_path, node) in doc.descendants_at(&block_path) {
            let Some(span) = node.as_text() else {
                continue;
            };
            if text_path < caret.path {
                continue;
            }
            if text_path == caret.path {
                let tail: String = span.text.chars().skip(caret.offset).collect();
                if !tail.is_empty() {
                    removals.push(Operation::RemoveText {
                        path: text_path.clone(),
                        offset: caret.offset,
                        text: tail.clone(),
                    });
                }
                moved.push(Node::marked(tail, span.marks));
            } else {
                removals.push(Operation::RemoveNode {
                    path: text_path.clone(),
                    node: node.clone(),
                });
                moved.push(node.clone());
            }
        }

        let kind = match block.kind {
            BlockKind::HeadingOne | BlockKind::HeadingTwo => BlockKind::Paragraph,
            ref kind => kind.clone(),
        };
        let mut element = Element::new(kind, moved);
        element.align = block.align;

        // 从后往前删，前面的路径保持有效
        let mut ops: Vec<Operation> = removals.into_iter().rev().collect();
        ops.push(Operation::InsertNode {
            path: new_path.clone(),
            node: Node::Element(element),
        });
        self.editor.apply_operations(ops)?;

        match self.editor.document().start_point(&new_path) {
            Some(start) => self.set_caret(start),
            None => Ok(true),
        }
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),    // 编辑器区域
                Constraint::Length(1), // 状态行
                Constraint::Length(1), // 快捷键提示
            ])
            .split(frame.area());

        let editor_area = chunks[0];
        let inner_width = editor_area.width.saturating_sub(2);
        if inner_width != self.content_width {
            self.on_resize(inner_width);
        }

        self.render_document(frame, editor_area);
        self.render_tooltip(frame);
        self.render_status_line(frame, chunks[1]);
        self.render_shortcuts(frame, chunks[2]);
    }

    fn layout_blocks(&self, width: u16) -> Vec<BlockRender> {
        let doc = self.editor.document();
        let caret = self.caret();
        let selection = self.editor.selection();
        doc.leaf_blocks()
            .into_iter()
            .map(|(path, element)| {
                let binary = (element.kind == BlockKind::BinaryCode)
                    .then(|| self.blocks.view(doc, element.id))
                    .flatten();
                view::render_block(BlockInput {
                    doc,
                    path: &path,
                    element,
                    width,
                    caret: caret.as_ref(),
                    selection,
                    binary: binary.as_ref(),
                })
            })
            .collect()
    }

    fn render_document(&mut self, frame: &mut Frame, area: Rect) {
        let frame_block = Block::default()
            .borders(Borders::ALL)
            .title(" richtext-binary ");
        let inner = frame_block.inner(area);
        frame.render_widget(frame_block, area);

        let renders = self.layout_blocks(inner.width);

        // 块之间空一行
        let mut starts = Vec::with_capacity(renders.len());
        let mut total = 0;
        for render in &renders {
            starts.push(total);
            total += render.lines.len() + 1;
        }

        let height = inner.height as usize;
        let caret_row = renders
            .iter()
            .zip(&starts)
            .find_map(|(render, start)| render.caret.map(|(row, _)| start + row));
        if let Some(row) = caret_row
            && height > 0
        {
            if row < self.scroll_top {
                self.scroll_top = row;
            } else if row >= self.scroll_top + height {
                self.scroll_top = row + 1 - height;
            }
        }
        self.scroll_top = self.scroll_top.min(total.saturating_sub(1));

        let visible = self.scroll_top..self.scroll_top + height;
        let row_y = |row: usize| inner.y + (row - self.scroll_top) as u16;
        let mut lines: Vec<Line<'static>> = Vec::with_capacity(total);
        let mut hits = Vec::new();
        let mut cursor = None;

        for (render, &start) in renders.iter().zip(&starts) {
            for (i, line) in render.lines.iter().enumerate() {
                let is_content = render.content_rows.contains(&i);
                let line = if is_content {
                    line.clone().alignment(render.alignment)
                } else {
                    line.clone()
                };
                lines.push(line);

                let row = start + i;
                if !visible.contains(&row) {
                    continue;
                }
                let y = row_y(row);
                if render.binary && !is_content {
                    for &(col, width, digit) in &render.controls {
                        hits.push(Hit {
                            area: Rect::new(inner.x + col, y, width, 1),
                            target: HitTarget::Control(render.id, digit),
                        });
                    }
                } else {
                    let target = if render.binary {
                        HitTarget::Content(render.id)
                    } else {
                        HitTarget::Text(render.id)
                    };
                    hits.push(Hit {
                        area: Rect::new(inner.x, y, inner.width, 1),
                        target,
                    });
                }
            }
            lines.push(Line::default());

            if let Some((row_in_block, col)) = render.caret
                && visible.contains(&(start + row_in_block))
            {
                let line_width = render.line_widths.get(row_in_block).copied().unwrap_or(0);
                let x = inner.x + view::aligned_x(render.alignment, inner.width, line_width) + col;
                let max_x = inner.x + inner.width.saturating_sub(1);
                cursor = Some((x.min(max_x), row_y(start + row_in_block)));
            }
        }

        let paragraph = Paragraph::new(lines).scroll((self.scroll_top as u16, 0));
        frame.render_widget(paragraph, inner);
        if let Some(position) = cursor {
            frame.set_cursor_position(position);
        }
        self.hits = hits;
    }

    fn render_tooltip(&self, frame: &mut Frame) {
        let Some(tooltip) = self
            .hovered
            .and_then(|id| self.blocks.presenter(id))
            .map(|presenter| presenter.tooltip())
            .filter(|tooltip| tooltip.visible)
        else {
            return;
        };
        let text = format!(" {} ", printable(&tooltip.text));
        let area = tooltip_area(frame.area(), tooltip.x, tooltip.y, text.width() as u16);
        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(text).style(Style::default().bg(Color::Black).fg(Color::White)),
            area,
        );
    }

    fn render_status_line(&self, frame: &mut Frame, area: Rect) {
        let status_text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else {
            let caret = self
                .caret()
                .map(|point| format!("{}:{}", point.path, point.offset))
                .unwrap_or_else(|| "-".to_string());
            let block = match self.focused {
                Some(id) => {
                    let layout = self.blocks.layout(id).unwrap_or_default();
                    let decoded = self
                        .blocks
                        .presenter(id)
                        .map(|presenter| printable(presenter.decoded()))
                        .unwrap_or_default();
                    format!(
                        " | 二进制块 {id} 每行:{} 余白:{:.0} 解码:{decoded}",
                        layout.characters_per_line, layout.trailing_padding
                    )
                }
                None => String::new(),
            };
            format!("光标:{caret}{block} | 版本:{}", self.editor.version())
        };

        let status_line = Paragraph::new(status_text).style(
            Style::default()
                .bg(Color::DarkGray)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );
        frame.render_widget(status_line, area);
    }

    /// 渲染快捷键提示
    fn render_shortcuts(&self, frame: &mut Frame, area: Rect) {
        let shortcuts = "Ctrl-X:退出  Ctrl-B:二进制块  Ctrl-O:引用  Ctrl-L/N:列表  Ctrl-E/R:居中/右对齐  Shift-←/→:选择  Alt-B/I/U/`:粗体/斜体/下划线/代码  Alt-H/J:标题  Tab:下一个二进制块  Alt-0/1:追加数字  ``` + 空格:新建二进制块";
        let shortcuts_line =
            Paragraph::new(shortcuts).style(Style::default().bg(Color::Blue).fg(Color::White));
        frame.render_widget(shortcuts_line, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_metrics_count_digits_and_cells() {
        let doc = Document::new(vec![Node::block(BlockKind::BinaryCode, "0110 1000")]);
        let id = doc.element(&Path::from([0])).unwrap().id;
        let metrics = CellMetrics::new(&doc, 40);
        assert_eq!(
            metrics.measure(id),
            Some(Measurement {
                container_width: 40.0,
                rendered_text_width: 9.0,
                digit_count: 8,
            })
        );
        assert_eq!(metrics.measure(NodeId(12345)), None);
    }

    #[test]
    fn test_tooltip_stays_on_screen() {
        let screen = Rect::new(0, 0, 80, 24);
        assert_eq!(tooltip_area(screen, 10.0, 5.0, 4), Rect::new(10, 6, 4, 1));
        assert_eq!(tooltip_area(screen, 79.0, 23.0, 4), Rect::new(76, 23, 4, 1));
        assert_eq!(
            tooltip_area(screen, f64::from(u16::MAX), f64::from(u16::MAX), 200),
            Rect::new(0, 23, 80, 1)
        );
    }

    #[test]
    fn test_enter_splits_block_at_caret() {
        let mut app = App::new(BinaryBlockConfig::default()).unwrap();
        let hi = app.editor.document().element(&Path::from([1])).unwrap().id;
        app.editor
            .set_selection(Selection::collapsed(Point::new([1, 0], 8)))
            .unwrap();
        app.split_block().unwrap();
        app.after_edit();

        let doc = app.editor.document();
        assert_eq!(doc.string(&Path::from([1])), "01101000");
        assert_eq!(doc.string(&Path::from([2])), "01101001");
        assert_eq!(doc.element(&Path::from([2])).unwrap().kind, BlockKind::BinaryCode);
        assert_eq!(app.blocks.blocks().count(), 3);
        assert_ne!(app.focused, Some(hi));
    }

    #[test]
    fn test_focus_follows_caret_into_binary_block() {
        let mut app = App::new(BinaryBlockConfig::default()).unwrap();
        assert_eq!(app.focused, None);
        app.focus_next_binary(true).unwrap();
        app.after_edit();
        let first = app.editor.document().element(&Path::from([1])).unwrap().id;
        assert_eq!(app.focused, Some(first));
        assert_eq!(
            app.blocks.presenter(first).map(|presenter| presenter.focus()),
            Some(richtext_binary::FocusState::Focused)
        );
    }
}
