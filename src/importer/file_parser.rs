// ==========================================
// 业务管理套件 - 表格解析器
// ==========================================
// 职责: 原始字节 → ParsedTable
//   1. 编码识别（BOM → UTF-8 有效性 → Windows-1250 启发式）
//   2. 分隔符识别（; , \t |）
//   3. 表头规范化（去空白、重复列告警）
//   4. 行补齐/截断、空行跳过、预览行数上限
// 失败: 仅当无法识别表头行时返回 MalformedInput
// ==========================================

use crate::config::ImportSettings;
use crate::domain::{ColumnStats, InferredType, ParseDiagnostic, ParsedTable, RawRow};
use crate::i18n::t_with_args;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::patterns::{self, Pattern, DATE, EMAIL, NUMBER, PHONE};
use csv::ReaderBuilder;
use encoding_rs::{Encoding, UTF_8, WINDOWS_1250};
use std::collections::HashSet;
use tracing::{debug, warn};

/// 候选分隔符（按优先级）
pub const DELIMITER_CANDIDATES: [char; 4] = [';', ',', '\t', '|'];

/// 列统计样例值上限
pub const MAX_SAMPLE_VALUES: usize = 5;

// Windows-1250 中捷克语变音字母所在字节
const CP1250_CZECH_BYTES: &[u8] = &[
    0x8A, 0x8D, 0x8E, 0x9A, 0x9D, 0x9E, // Š Ť Ž š ť ž
    0xC1, 0xC8, 0xC9, 0xCC, 0xCD, 0xCF, 0xD2, 0xD3, 0xD8, 0xD9, 0xDA, 0xDD, // Á Č É Ě Í Ď Ň Ó Ř Ů Ú Ý
    0xE1, 0xE8, 0xE9, 0xEC, 0xED, 0xEF, 0xF2, 0xF3, 0xF8, 0xF9, 0xFA, 0xFD, // á č é ě í ď ň ó ř ů ú ý
];

// ==========================================
// ParseOptions
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    pub max_rows: Option<usize>,      // 预览用行数上限；None 表示完整解析
    pub encoding_sniff_bytes: usize,  // 编码嗅探窗口
    pub delimiter_sniff_lines: usize, // 分隔符嗅探行数
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::from_settings(&ImportSettings::default())
    }
}

impl ParseOptions {
    pub fn from_settings(settings: &ImportSettings) -> Self {
        Self {
            max_rows: None,
            encoding_sniff_bytes: settings.encoding_sniff_bytes,
            delimiter_sniff_lines: settings.delimiter_sniff_lines,
        }
    }

    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = Some(max_rows);
        self
    }
}

// ==========================================
// TableParser
// ==========================================
pub struct TableParser;

impl TableParser {
    /// 解析原始字节为表格
    ///
    /// # 返回
    /// - Ok(ParsedTable): 表头 + 数据行（可能为 0 行）
    /// - Err(MalformedInput): 无法识别表头行
    pub fn parse(bytes: &[u8], options: &ParseOptions) -> ImportResult<ParsedTable> {
        let mut diagnostics = Vec::new();

        let (text, encoding) = Self::decode(bytes, options.encoding_sniff_bytes, &mut diagnostics);
        let delimiter = Self::detect_delimiter(&text, options.delimiter_sniff_lines);
        debug!(encoding, delimiter = ?delimiter, bytes = bytes.len(), "编码与分隔符识别完成");

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true) // 允许行长度不一致
            .delimiter(delimiter as u8)
            .from_reader(text.as_bytes());

        let mut records = reader.records();

        // ===== 表头 =====
        let header_record = match records.next() {
            Some(result) => result?,
            None => {
                return Err(ImportError::MalformedInput(
                    "文件为空，未找到表头行".to_string(),
                ))
            }
        };

        let mut headers: Vec<String> = Vec::new();
        let mut columns: Vec<(usize, String)> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for (idx, raw) in header_record.iter().enumerate() {
            let name = raw.trim_start_matches('\u{feff}').trim().to_string();
            if name.is_empty() {
                let index = (idx + 1).to_string();
                diagnostics.push(ParseDiagnostic {
                    line: 1,
                    message: t_with_args("parser.blank_header", &[("index", index.as_str())]),
                });
                continue;
            }
            if !seen.insert(name.clone()) {
                warn!(column = %name, "重复表头，保留首次出现");
                diagnostics.push(ParseDiagnostic {
                    line: 1,
                    message: t_with_args("parser.duplicate_header", &[("column", name.as_str())]),
                });
                continue;
            }
            headers.push(name.clone());
            columns.push((idx, name));
        }

        if headers.is_empty() {
            return Err(ImportError::MalformedInput(
                "表头行不包含任何列名".to_string(),
            ));
        }

        // ===== 数据行 =====
        let expected = header_record.len();
        let mut rows: Vec<RawRow> = Vec::new();
        let mut truncated = false;

        for result in records {
            let record = result?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            // 跳过完全空白的行
            if record.iter().all(|v| v.trim().is_empty()) {
                continue;
            }

            if let Some(max) = options.max_rows {
                if rows.len() >= max {
                    truncated = true;
                    break;
                }
            }

            let found = record.len().to_string();
            let expected_str = expected.to_string();
            if record.len() < expected {
                diagnostics.push(ParseDiagnostic {
                    line,
                    message: t_with_args(
                        "parser.short_row",
                        &[("found", found.as_str()), ("expected", expected_str.as_str())],
                    ),
                });
            } else if record.len() > expected {
                diagnostics.push(ParseDiagnostic {
                    line,
                    message: t_with_args(
                        "parser.long_row",
                        &[("found", found.as_str()), ("expected", expected_str.as_str())],
                    ),
                });
            }

            let row: RawRow = columns
                .iter()
                .map(|(idx, name)| {
                    let value = record.get(*idx).map(str::trim).unwrap_or("");
                    (name.clone(), value.to_string())
                })
                .collect();
            rows.push(row);
        }

        debug!(
            columns = headers.len(),
            rows = rows.len(),
            diagnostics = diagnostics.len(),
            truncated,
            "表格解析完成"
        );

        Ok(ParsedTable {
            row_count: rows.len(),
            headers,
            rows,
            diagnostics,
            delimiter,
            encoding: encoding.to_string(),
            truncated,
        })
    }

    /// 识别编码并解码
    ///
    /// # 顺序
    /// 1. BOM（UTF-8 / UTF-16LE / UTF-16BE）
    /// 2. 嗅探窗口为合法 UTF-8 → UTF-8
    /// 3. 嗅探窗口含捷克语 Windows-1250 字节 → Windows-1250
    /// 4. 其余按 UTF-8 有损解码
    fn decode(
        bytes: &[u8],
        sniff_bytes: usize,
        diagnostics: &mut Vec<ParseDiagnostic>,
    ) -> (String, &'static str) {
        let (encoding, body): (&'static Encoding, &[u8]) = match Encoding::for_bom(bytes) {
            Some((encoding, bom_len)) => (encoding, &bytes[bom_len..]),
            None => {
                let window = &bytes[..bytes.len().min(sniff_bytes)];
                if !Self::is_utf8_window(window) && Self::has_cp1250_czech_bytes(window) {
                    (WINDOWS_1250, bytes)
                } else {
                    (UTF_8, bytes)
                }
            }
        };

        let (text, had_errors) = encoding.decode_without_bom_handling(body);
        if had_errors {
            warn!(encoding = encoding.name(), "存在无法解码的字节，已替换");
            diagnostics.push(ParseDiagnostic {
                line: 0,
                message: t_with_args("parser.invalid_bytes", &[("encoding", encoding.name())]),
            });
        }

        (text.into_owned(), encoding.name())
    }

    // 窗口末尾被截断的多字节序列视为合法
    fn is_utf8_window(window: &[u8]) -> bool {
        match std::str::from_utf8(window) {
            Ok(_) => true,
            Err(e) => e.error_len().is_none(),
        }
    }

    fn has_cp1250_czech_bytes(window: &[u8]) -> bool {
        window.iter().any(|b| CP1250_CZECH_BYTES.contains(b))
    }

    /// 识别分隔符: 统计前 N 行各候选出现次数，取最多者；并列或全为 0 → ","
    pub fn detect_delimiter(text: &str, sniff_lines: usize) -> char {
        let sample: Vec<&str> = text.lines().take(sniff_lines.max(1)).collect();

        let counts: Vec<(char, usize)> = DELIMITER_CANDIDATES
            .iter()
            .map(|d| (*d, sample.iter().map(|line| line.matches(*d).count()).sum::<usize>()))
            .collect();

        let max = counts.iter().map(|(_, c)| *c).max().unwrap_or(0);
        let winners: Vec<char> = counts
            .iter()
            .filter(|(_, c)| *c == max)
            .map(|(d, _)| *d)
            .collect();

        match winners.as_slice() {
            [only] if max > 0 => *only,
            _ => ',',
        }
    }
}

// ==========================================
// 列统计（仅诊断展示）
// ==========================================

/// 计算各列统计
///
/// # 参数
/// - sample_rows: 类型推断采样行数
/// - threshold: 命中比例阈值（≥ 该值即推断为对应类型）
pub fn column_stats(table: &ParsedTable, sample_rows: usize, threshold: f64) -> Vec<ColumnStats> {
    table
        .headers
        .iter()
        .map(|column| {
            let values: Vec<&str> = table
                .rows
                .iter()
                .filter_map(|row| row.get(column))
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .collect();

            let mut distinct: HashSet<&str> = HashSet::new();
            let mut samples: Vec<String> = Vec::new();
            for value in &values {
                if distinct.insert(value) && samples.len() < MAX_SAMPLE_VALUES {
                    samples.push(value.to_string());
                }
            }

            let sample: Vec<&str> = table
                .rows
                .iter()
                .take(sample_rows)
                .filter_map(|row| row.get(column))
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .collect();

            ColumnStats {
                column: column.clone(),
                non_empty_count: values.len(),
                distinct_count: distinct.len(),
                samples,
                inferred_type: infer_type(&sample, threshold),
            }
        })
        .collect()
}

fn infer_type(sample: &[&str], threshold: f64) -> InferredType {
    if sample.is_empty() {
        return InferredType::String;
    }

    // 日期须先于电话判断（ISO 日期也符合电话字符集）
    let checks: [(InferredType, &Pattern); 4] = [
        (InferredType::Email, &EMAIL),
        (InferredType::Date, &DATE),
        (InferredType::Phone, &PHONE),
        (InferredType::Number, &NUMBER),
    ];

    for (kind, pattern) in checks {
        let hits = sample.iter().filter(|v| patterns::is_match(pattern, v)).count();
        if hits as f64 / sample.len() as f64 >= threshold {
            return kind;
        }
    }
    InferredType::String
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(bytes: &[u8]) -> ParsedTable {
        TableParser::parse(bytes, &ParseOptions::default()).unwrap()
    }

    #[test]
    fn test_semicolon_utf8_with_bom() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("Název;IČ\nAlfa s.r.o.;12345678\n".as_bytes());

        let table = parse(&bytes);

        assert_eq!(table.delimiter, ';');
        assert_eq!(table.encoding, "UTF-8");
        assert_eq!(table.headers, vec!["Název", "IČ"]);
        assert_eq!(table.rows[0].get("IČ").unwrap(), "12345678");
    }

    #[test]
    fn test_windows_1250_detection() {
        // "Příjmení;Město\nNovák;Plzeň" v cp1250
        let (encoded, _, _) = WINDOWS_1250.encode("Příjmení;Město\nNovák;Plzeň\n");
        let table = parse(&encoded);

        assert_eq!(table.encoding, "windows-1250");
        assert_eq!(table.headers, vec!["Příjmení", "Město"]);
        assert_eq!(table.rows[0].get("Město").unwrap(), "Plzeň");
    }

    #[test]
    fn test_utf8_czech_text_not_mistaken_for_cp1250() {
        let table = parse("Jméno,Město\nŠárka,Čáslav\n".as_bytes());
        assert_eq!(table.encoding, "UTF-8");
        assert_eq!(table.rows[0].get("Jméno").unwrap(), "Šárka");
    }

    #[test]
    fn test_detect_delimiter_tie_defaults_to_comma() {
        assert_eq!(TableParser::detect_delimiter("a;b,c", 5), ',');
        assert_eq!(TableParser::detect_delimiter("", 5), ',');
        assert_eq!(TableParser::detect_delimiter("a\tb\tc\n1\t2\t3", 5), '\t');
        assert_eq!(TableParser::detect_delimiter("a|b|c", 5), '|');
    }

    #[test]
    fn test_ragged_rows_are_padded_and_truncated() {
        let table = parse(b"a,b,c\n1,2\n3,4,5,6\n");

        assert_eq!(table.row_count, 2);
        assert_eq!(table.rows[0].get("c").unwrap(), "");
        assert_eq!(table.rows[1].len(), 3);
        assert_eq!(table.diagnostics.len(), 2);
        assert_eq!(table.diagnostics[0].line, 2);
        assert_eq!(table.diagnostics[1].line, 3);
    }

    #[test]
    fn test_duplicate_headers_keep_first_with_warning() {
        let table = parse(b"email,email,name\na@x.cz,b@x.cz,Jan\n");

        assert_eq!(table.headers, vec!["email", "name"]);
        assert_eq!(table.rows[0].get("email").unwrap(), "a@x.cz");
        assert_eq!(table.diagnostics.len(), 1);
    }

    #[test]
    fn test_blank_rows_skipped_and_row_cap() {
        let bytes = b"a;b\n1;2\n\n;\n3;4\n5;6\n";
        let full = parse(bytes);
        assert_eq!(full.row_count, 3);
        assert!(!full.truncated);

        let preview =
            TableParser::parse(bytes, &ParseOptions::default().with_max_rows(2)).unwrap();
        assert_eq!(preview.row_count, 2);
        assert!(preview.truncated);
    }

    #[test]
    fn test_missing_header_is_malformed() {
        assert!(matches!(
            TableParser::parse(b"", &ParseOptions::default()),
            Err(ImportError::MalformedInput(_))
        ));
        assert!(matches!(
            TableParser::parse(b" , ,\n1,2,3\n", &ParseOptions::default()),
            Err(ImportError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_column_stats_inference() {
        let table = parse(
            "mail;tel;datum;cena;pozn\n\
             a@x.cz;777123456;1.2.2024;100;x\n\
             b@x.cz;+420 602 111 222;2024-02-03;2 500,50;y\n\
             c@x.cz;603222333;5.3.24;99;x\n"
                .as_bytes(),
        );

        let stats = column_stats(&table, 100, 0.7);
        let kinds: Vec<InferredType> = stats.iter().map(|s| s.inferred_type).collect();

        assert_eq!(
            kinds,
            vec![
                InferredType::Email,
                InferredType::Phone,
                InferredType::Date,
                InferredType::Number,
                InferredType::String,
            ]
        );
        assert_eq!(stats[4].distinct_count, 2);
        assert_eq!(stats[4].non_empty_count, 3);
        assert_eq!(stats[4].samples, vec!["x", "y"]);
    }
}
