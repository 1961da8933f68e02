// ==========================================
// KC/KCP 绩效报表 ETL - 原始工作表
// ==========================================
// 用途: 工作表源读取出的二维文本网格，不含表头语义
// 生命周期: 每个工作表读取一次，清洗后丢弃
// ==========================================

/// 原始工作表（行 × 列 文本单元格）
///
/// 行长度不一致时按最宽行补齐空字符串，保证按绝对下标访问
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSheet {
    rows: Vec<Vec<String>>,
    width: usize,
}

impl RawSheet {
    /// 从行数据构造（自动补齐列宽）
    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        let width = rows.iter().map(|r| r.len()).max().unwrap_or(0);
        let rows = rows
            .into_iter()
            .map(|mut r| {
                r.resize(width, String::new());
                r
            })
            .collect();
        Self { rows, width }
    }

    /// 从字符串切片构造（测试/嵌入场景）
    pub fn from_str_rows(rows: &[&[&str]]) -> Self {
        Self::from_rows(
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// 读取单元格；越界返回空字符串
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(|s| s.as_str())
            .unwrap_or("")
    }
}
