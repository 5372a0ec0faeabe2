// ==========================================
// CSV 导入核心 - 分隔文本解析器
// ==========================================
// 职责: 已解码文本 → 单元格网格 (Grid)
// 算法: 单遍字符级状态机，唯一布尔状态 in_quoted_cell
// ==========================================
// 已知限制（非 RFC 4180）:
// - 引号内的 "" 不视为转义，两次切换后不输出引号字符
// - 引号不配对时不报错，以最后的引号状态结束
// - 行首的单个空引号单元格 ("") 视为空行
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::import_trait::FileParser;

// ==========================================
// ParserOptions - 解析选项
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserOptions {
    pub quote: char,
    pub delimiter: char,
    pub newline_chars: Vec<char>, // 任一字符即视为换行
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            quote: '"',
            delimiter: ',',
            newline_chars: vec!['\r', '\n'],
        }
    }
}

impl ParserOptions {
    fn is_newline(&self, ch: char) -> bool {
        self.newline_chars.contains(&ch)
    }
}

// ==========================================
// Grid - 单元格网格
// ==========================================
// 行长度可以不一致；max_x 为出现过的最大列数，max_y 为行数
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grid {
    rows: Vec<Vec<String>>,
    max_x: usize,
    max_y: usize,
}

impl Grid {
    /// 取单元格 (x = 列, y = 行)
    ///
    /// # 返回
    /// - Err(OutOfRange): 该位置从未写入
    pub fn get(&self, x: usize, y: usize) -> ImportResult<&str> {
        self.rows
            .get(y)
            .and_then(|row| row.get(x))
            .map(String::as_str)
            .ok_or(ImportError::OutOfRange { x, y })
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row(&self, y: usize) -> Option<&[String]> {
        self.rows.get(y).map(Vec::as_slice)
    }

    /// 第 0 行（表头）
    pub fn header(&self) -> Option<&[String]> {
        self.row(0)
    }

    pub fn max_x(&self) -> usize {
        self.max_x
    }

    pub fn max_y(&self) -> usize {
        self.max_y
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 行列转置后的视图（按列读取）
    ///
    /// 结果为 max_x 列 × max_y 行，未写入的位置为 None
    pub fn transposed_rows(&self) -> Vec<Vec<Option<&str>>> {
        let mut columns = vec![vec![None; self.max_y]; self.max_x];
        for (y, row) in self.rows.iter().enumerate() {
            for (x, cell) in row.iter().enumerate() {
                columns[x][y] = Some(cell.as_str());
            }
        }
        columns
    }

    fn push_row(&mut self, row: Vec<String>) {
        self.max_x = self.max_x.max(row.len());
        self.rows.push(row);
        self.max_y = self.rows.len();
    }
}

// ==========================================
// ParserState - 解析状态（显式传递，无全局游标）
// ==========================================
#[derive(Debug, Default)]
struct ParserState {
    in_quoted_cell: bool,
    cell: String,
    row: Vec<String>,
    grid: Grid,
}

impl ParserState {
    fn accept(mut self, ch: char, options: &ParserOptions) -> Self {
        if ch == options.delimiter && !self.in_quoted_cell {
            self.close_cell();
        } else if ch == options.quote {
            self.in_quoted_cell = !self.in_quoted_cell;
        } else if options.is_newline(ch) && !self.in_quoted_cell {
            self.close_row();
        } else {
            self.cell.push(ch);
        }
        self
    }

    fn close_cell(&mut self) {
        self.row.push(std::mem::take(&mut self.cell));
    }

    /// 行结束；x == 0 且缓冲为空时为空行，不产生新行
    fn close_row(&mut self) {
        if self.cell.is_empty() && self.row.is_empty() {
            return;
        }
        self.close_cell();
        let row = std::mem::take(&mut self.row);
        self.grid.push_row(row);
    }

    fn finish(mut self) -> Grid {
        // 末尾无换行时提交最后一行；末尾有换行时不会残留空行
        self.close_row();
        self.grid
    }
}

// ==========================================
// DelimitedTextParser
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct DelimitedTextParser {
    options: ParserOptions,
}

impl DelimitedTextParser {
    pub fn new(options: ParserOptions) -> Self {
        Self { options }
    }

    pub fn parse(&self, text: &str) -> Grid {
        text.chars()
            .fold(ParserState::default(), |state, ch| {
                state.accept(ch, &self.options)
            })
            .finish()
    }
}

impl FileParser for DelimitedTextParser {
    fn parse_to_grid(&self, text: &str) -> Grid {
        self.parse(text)
    }
}
