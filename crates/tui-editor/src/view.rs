//! 把文档块排成终端行
//!
//! 每个叶子块先展开成逐字符的 [`Cell`]，再按宽度（二进制块按整字节）折行。
//! 光标位置与鼠标命中区域都从同一份折行结果算出。

use std::ops::Range;

use ratatui::{
    layout::Alignment as LineAlignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use richtext_binary::{BlockView, Digit, Segment};
use richtext_core::{Alignment, BlockKind, Document, Element, Marks, NodeId, Path, Point, Selection};
use unicode_width::UnicodeWidthChar;

/// 单个字符单元
#[derive(Debug, Clone)]
pub struct Cell {
    pub ch: char,
    pub width: u16,
    pub style: Style,
    /// 所在文本节点路径与字符偏移
    pub at: (Path, usize),
}

/// 一个块渲染后的结果
#[derive(Debug, Clone)]
pub struct BlockRender {
    pub id: NodeId,
    pub binary: bool,
    pub lines: Vec<Line<'static>>,
    /// 每行的显示宽度（含前缀）
    pub line_widths: Vec<u16>,
    pub alignment: LineAlignment,
    /// 光标所在 (行, 列)，列不含对齐偏移
    pub caret: Option<(usize, u16)>,
    /// 正文所在行（二进制块的悬停区域）
    pub content_rows: Range<usize>,
    /// 按钮：(起始列, 宽度, 数字)，位于第 0 行
    pub controls: Vec<(u16, u16, Digit)>,
}

pub fn line_alignment(align: Option<Alignment>) -> LineAlignment {
    match align {
        Some(Alignment::Center) => LineAlignment::Center,
        Some(Alignment::Right) => LineAlignment::Right,
        // 终端里两端对齐退化为左对齐
        Some(Alignment::Left) | Some(Alignment::Justify) | None => LineAlignment::Left,
    }
}

/// 行在 `area_width` 中的起始列
pub fn aligned_x(alignment: LineAlignment, area_width: u16, line_width: u16) -> u16 {
    match alignment {
        LineAlignment::Left => 0,
        LineAlignment::Center => area_width.saturating_sub(line_width) / 2,
        LineAlignment::Right => area_width.saturating_sub(line_width),
    }
}

pub fn style_for_marks(marks: Marks) -> Style {
    let mut style = Style::default();
    if marks.bold {
        style = style.add_modifier(Modifier::BOLD);
    }
    if marks.italic {
        style = style.add_modifier(Modifier::ITALIC);
    }
    if marks.underline {
        style = style.add_modifier(Modifier::UNDERLINED);
    }
    if marks.code {
        style = style.fg(Color::Yellow).bg(Color::Rgb(0x30, 0x30, 0x30));
    }
    style
}

fn block_style(kind: &BlockKind) -> Style {
    match kind {
        BlockKind::HeadingOne => Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        BlockKind::HeadingTwo => Style::default().add_modifier(Modifier::BOLD),
        BlockKind::BlockQuote => Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::ITALIC),
        BlockKind::CodeBlock => Style::default().fg(Color::Yellow),
        BlockKind::BinaryCode => Style::default().fg(Color::Cyan),
        _ => Style::default(),
    }
}

/// 块前缀（引用线、列表符号）
fn prefix_for(doc: &Document, path: &Path, element: &Element) -> String {
    let depth = path.len().saturating_sub(1);
    let indent = "  ".repeat(depth.saturating_sub(1));
    match &element.kind {
        BlockKind::BlockQuote => format!("{indent}│ "),
        BlockKind::ListItem => {
            let numbered = path
                .parent()
                .and_then(|parent| doc.element(&parent))
                .is_some_and(|list| list.kind == BlockKind::NumberedList);
            if numbered {
                format!("{indent}{}. ", path.last().unwrap_or(0) + 1)
            } else {
                format!("{indent}• ")
            }
        }
        _ => indent,
    }
}

fn cells_of(doc: &Document, path: &Path, base: Style) -> Vec<Cell> {
    let mut cells = Vec::new();
    for (text_path, node) in doc.descendants_at(path) {
        let Some(span) = node.as_text() else {
            continue;
        };
        let style = base.patch(style_for_marks(span.marks));
        for (offset, ch) in span.text.chars().enumerate() {
            cells.push(Cell {
                ch,
                width: ch.width().unwrap_or(0) as u16,
                style,
                at: (text_path.clone(), offset),
            });
        }
    }
    cells
}

/// 用二进制块视图的分段样式覆盖单元样式
fn apply_binary_view(cells: &mut [Cell], view: &BlockView, base: Style) {
    let styles = view.segments.iter().flat_map(|segment| match segment {
        Segment::Span { text, marks } => {
            let style = base.patch(style_for_marks(*marks));
            text.chars().map(|_| style).collect::<Vec<_>>()
        }
        Segment::Digit { color, .. } => {
            let mut style = Style::default().add_modifier(Modifier::BOLD);
            if let Some(rgb) = color {
                style = style.fg(Color::Rgb(rgb.r, rgb.g, rgb.b));
            }
            vec![style]
        }
    });
    for (cell, style) in cells.iter_mut().zip(styles) {
        cell.style = style;
    }
}

/// 折行：`characters_per_line > 0` 时每行恰好放这么多数字，否则按宽度折行
pub fn wrap_cells(cells: &[Cell], width: u16, characters_per_line: usize) -> Vec<Range<usize>> {
    let mut rows = Vec::new();
    let mut start = 0;
    let mut row_width: u16 = 0;
    let mut digits = 0;
    for (i, cell) in cells.iter().enumerate() {
        let is_digit = matches!(cell.ch, '0' | '1');
        let full_bytes = characters_per_line > 0 && is_digit && digits == characters_per_line;
        let too_wide = width > 0 && row_width + cell.width > width && i > start;
        if full_bytes || too_wide {
            rows.push(start..i);
            start = i;
            row_width = 0;
            digits = 0;
        }
        row_width += cell.width;
        if is_digit {
            digits += 1;
        }
    }
    rows.push(start..cells.len());
    rows
}

/// 光标在折行结果中的 (行, 列)
fn caret_in(cells: &[Cell], rows: &[Range<usize>], caret: &Point) -> (usize, u16) {
    let target = (&caret.path, caret.offset);
    let index = cells
        .iter()
        .position(|cell| (&cell.at.0, cell.at.1) >= target)
        .unwrap_or(cells.len());
    let row = rows
        .iter()
        .position(|range| range.contains(&index))
        .unwrap_or(rows.len().saturating_sub(1));
    let col = rows
        .get(row)
        .map(|range| cells[range.start..index.min(range.end)].iter().map(|c| c.width).sum())
        .unwrap_or(0);
    (row, col)
}

fn row_line(prefix: &str, prefix_style: Style, cells: &[Cell]) -> (Line<'static>, u16) {
    let mut spans = Vec::with_capacity(cells.len() + 1);
    let mut width = 0;
    if !prefix.is_empty() {
        width += prefix.chars().filter_map(|ch| ch.width()).sum::<usize>() as u16;
        spans.push(Span::styled(prefix.to_string(), prefix_style));
    }
    for cell in cells {
        width += cell.width;
        spans.push(Span::styled(cell.ch.to_string(), cell.style));
    }
    (Line::from(spans), width)
}

/// 渲染一个叶子块
pub struct BlockInput<'a> {
    pub doc: &'a Document,
    pub path: &'a Path,
    pub element: &'a Element,
    pub width: u16,
    pub caret: Option<&'a Point>,
    /// 非折叠选区，选中的字符反色显示
    pub selection: Option<&'a Selection>,
    /// 二进制块的视图（普通块为 `None`）
    pub binary: Option<&'a BlockView>,
}

pub fn render_block(input: BlockInput<'_>) -> BlockRender {
    let BlockInput {
        doc,
        path,
        element,
        width,
        caret,
        selection,
        binary,
    } = input;
    let base = block_style(&element.kind);
    let prefix = prefix_for(doc, path, element);
    let prefix_width = prefix.chars().filter_map(|ch| ch.width()).sum::<usize>() as u16;
    let continuation = " ".repeat(prefix_width as usize);
    let prefix_style = Style::default().fg(Color::DarkGray);

    let mut cells = cells_of(doc, path, base);
    let mut lines = Vec::new();
    let mut line_widths = Vec::new();
    let mut controls = Vec::new();

    let characters_per_line = match binary {
        Some(view) => {
            apply_binary_view(&mut cells, view, base);
            let mut col = prefix_width;
            let mut spans = vec![Span::styled(prefix.clone(), prefix_style)];
            for control in &view.controls {
                let label = format!("[{}]", control.label);
                let w = label.chars().count() as u16;
                controls.push((col, w, control.digit));
                spans.push(Span::styled(
                    label,
                    Style::default().fg(Color::Black).bg(Color::Gray),
                ));
                spans.push(Span::raw(" "));
                col += w + 1;
            }
            lines.push(Line::from(spans));
            line_widths.push(col);
            view.layout.characters_per_line
        }
        None => 0,
    };

    if let Some(selection) = selection.filter(|selection| !selection.is_collapsed()) {
        let (start, end) = (selection.start(), selection.end());
        for cell in &mut cells {
            let at = (&cell.at.0, cell.at.1);
            if at >= (&start.path, start.offset) && at < (&end.path, end.offset) {
                cell.style = cell.style.add_modifier(Modifier::REVERSED);
            }
        }
    }

    let content_start = lines.len();
    let rows = wrap_cells(&cells, width.saturating_sub(prefix_width), characters_per_line);
    for (i, range) in rows.iter().enumerate() {
        let lead = if i == 0 { prefix.as_str() } else { continuation.as_str() };
        let (line, w) = row_line(lead, prefix_style, &cells[range.clone()]);
        lines.push(line);
        line_widths.push(w);
    }

    let caret = caret
        .filter(|point| path.is_ancestor_of(&point.path))
        .map(|point| {
            let (row, col) = caret_in(&cells, &rows, point);
            (content_start + row, prefix_width + col)
        });

    BlockRender {
        id: element.id,
        binary: binary.is_some(),
        content_rows: content_start..lines.len(),
        lines,
        line_widths,
        alignment: line_alignment(element.align),
        caret,
        controls,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use richtext_core::Node;

    fn digit_cells(text: &str) -> Vec<Cell> {
        text.chars()
            .enumerate()
            .map(|(offset, ch)| Cell {
                ch,
                width: 1,
                style: Style::default(),
                at: (Path::from([0, 0]), offset),
            })
            .collect()
    }

    #[test]
    fn test_wrap_cells_by_whole_bytes() {
        let cells = digit_cells(&"01".repeat(12));
        assert_eq!(wrap_cells(&cells, 20, 8), vec![0..8, 8..16, 16..24]);
        assert_eq!(wrap_cells(&cells, 10, 0), vec![0..10, 10..20, 20..24]);
        assert_eq!(wrap_cells(&[], 10, 8), vec![0..0]);
    }

    #[test]
    fn test_caret_after_last_cell() {
        let cells = digit_cells("0110100001");
        let rows = wrap_cells(&cells, 20, 8);
        assert_eq!(caret_in(&cells, &rows, &Point::new([0, 0], 10)), (1, 2));
        assert_eq!(caret_in(&cells, &rows, &Point::new([0, 0], 3)), (0, 3));
    }

    #[test]
    fn test_list_items_get_markers() {
        let doc = Document::new(vec![Node::element(
            BlockKind::NumberedList,
            vec![
                Node::block(BlockKind::ListItem, "a"),
                Node::block(BlockKind::ListItem, "b"),
            ],
        )]);
        let path = Path::from([0, 1]);
        let element = doc.element(&path).unwrap();
        assert_eq!(prefix_for(&doc, &path, element), "2. ");
    }

    #[test]
    fn test_selected_cells_are_reversed() {
        let doc = Document::new(vec![Node::block(BlockKind::Paragraph, "abcd")]);
        let path = Path::from([0]);
        let element = doc.element(&path).unwrap();
        let selection = Selection::new(Point::new([0, 0], 1), Point::new([0, 0], 3));
        let render = render_block(BlockInput {
            doc: &doc,
            path: &path,
            element,
            width: 20,
            caret: Some(&selection.focus),
            selection: Some(&selection),
            binary: None,
        });
        let reversed: String = render.lines[0]
            .spans
            .iter()
            .filter(|span| span.style.add_modifier.contains(Modifier::REVERSED))
            .map(|span| span.content.as_ref())
            .collect();
        assert_eq!(reversed, "bc");
        assert_eq!(render.caret, Some((0, 3)));
    }
}
