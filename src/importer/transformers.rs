// ==========================================
// 业务管理套件 - 字段规范化函数库
// ==========================================
// 职责: 日期/电话/税号/金额/时长/GPS/姓名/slug/富文本 规范化
// 约定: 所有函数均为全函数，无法解析时返回 None 或尽力而为的结果，绝不 panic
// 地区相关启发式委托给 LocaleStrategy
// ==========================================

use crate::domain::{BlockKind, GpsPoint, RichTextBlock};
use crate::importer::clock::Clock;
use crate::importer::locale::{CzechLocale, LocaleStrategy};
use crate::importer::patterns::{self, DURATION_CLOCK, DURATION_PART, EMAIL};
use chrono::NaiveDate;
use heck::ToKebabCase;
use std::sync::Arc;

/// 占位邮箱域名（保留域，保证不可投递）
pub const PLACEHOLDER_EMAIL_DOMAIN: &str = "noemail.invalid";

// ==========================================
// FieldTransformer
// ==========================================
#[derive(Clone)]
pub struct FieldTransformer {
    locale: Arc<dyn LocaleStrategy>,
}

impl Default for FieldTransformer {
    fn default() -> Self {
        Self::new(Arc::new(CzechLocale))
    }
}

impl FieldTransformer {
    pub fn new(locale: Arc<dyn LocaleStrategy>) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> &dyn LocaleStrategy {
        self.locale.as_ref()
    }

    // ==========================================
    // 日期
    // ==========================================

    /// 解析日期
    ///
    /// # 支持格式
    /// - D.M.YYYY / DD.MM.YYYY
    /// - DD.MM.YY（两位年份按分界年展开）
    /// - YYYY-MM-DD
    /// - 带空格的点分写法（"5. 3. 2024"）
    pub fn parse_date(&self, raw: &str) -> Option<NaiveDate> {
        let value = raw.trim();
        if value.is_empty() {
            return None;
        }

        if value.contains('-') {
            return Self::parse_iso_date(value);
        }

        let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
        let mut parts: Vec<&str> = compact.split('.').collect();
        if parts.last() == Some(&"") {
            parts.pop();
        }
        if parts.len() != 3 || parts.iter().any(|p| p.is_empty() || !is_digits(p)) {
            return None;
        }
        if parts[0].len() > 2 || parts[1].len() > 2 {
            return None;
        }

        let day: u32 = parts[0].parse().ok()?;
        let month: u32 = parts[1].parse().ok()?;
        let year: i32 = match parts[2].len() {
            4 => parts[2].parse().ok()?,
            2 => {
                let short: u32 = parts[2].parse().ok()?;
                if short < self.locale.year_pivot() {
                    2000 + short as i32
                } else {
                    1900 + short as i32
                }
            }
            _ => return None,
        };

        NaiveDate::from_ymd_opt(year, month, day)
    }

    fn parse_iso_date(value: &str) -> Option<NaiveDate> {
        // 容忍 "2024-03-05T10:00" / "2024-03-05 10:00"
        let date_part = value.split(['T', ' ']).next()?;
        let parts: Vec<&str> = date_part.split('-').collect();
        if parts.len() != 3 || parts[0].len() != 4 || !parts.iter().all(|p| is_digits(p)) {
            return None;
        }

        NaiveDate::from_ymd_opt(
            parts[0].parse().ok()?,
            parts[1].parse().ok()?,
            parts[2].parse().ok()?,
        )
    }

    /// 格式化为 ISO 日期
    pub fn format_iso(date: NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }

    // ==========================================
    // 电话
    // ==========================================

    /// 规范化电话号码为 "+420 777 123 456"
    ///
    /// # 规则
    /// - 仅保留数字，识别 "+" 与 "00" 国际前缀
    /// - 国内号码多出一位且以 0 开头时去掉中继 0
    /// - 恰好为国内号码位数时补国家码
    pub fn normalize_phone(&self, raw: &str) -> Option<String> {
        let value = raw.trim();
        let mut digits: String = value.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() {
            return None;
        }

        let code = self.locale.calling_code();
        let national_len = self.locale.national_number_len();

        let mut international = value.starts_with('+');
        if !international && digits.len() != national_len {
            if digits.starts_with("00") {
                digits.drain(..2);
                international = true;
            } else if digits.len() == national_len + 1 && digits.starts_with('0') {
                digits.remove(0);
            }
        }

        let national = if !international && digits.len() == national_len {
            digits
        } else if digits.len() == code.len() + national_len && digits.starts_with(code) {
            digits[code.len()..].to_string()
        } else if (8..=15).contains(&digits.len()) && international {
            return Some(format!("+{}", digits));
        } else {
            return None;
        };

        Some(format!("+{} {}", code, group_digits(&national, 3)))
    }

    // ==========================================
    // 税号
    // ==========================================

    /// 公司识别号: 补齐 8 位，超长或含非数字 → None
    pub fn normalize_ico(raw: &str) -> Option<String> {
        let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() || compact.len() > 8 || !is_digits(&compact) {
            return None;
        }
        Some(format!("{:0>8}", compact))
    }

    /// 增值税号: 可选国家前缀 + 8~10 位数字，输出带前缀
    pub fn normalize_dic(&self, raw: &str) -> Option<String> {
        let compact: String = raw
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_uppercase();

        let (prefix, rest) = match compact.get(..2) {
            Some(head) if head.chars().all(|c| c.is_ascii_alphabetic()) => {
                (head.to_string(), &compact[2..])
            }
            _ => (self.locale.vat_prefix().to_string(), compact.as_str()),
        };

        if !(8..=10).contains(&rest.len()) || !is_digits(rest) {
            return None;
        }
        Some(format!("{}{}", prefix, rest))
    }

    // ==========================================
    // 数值 / 金额
    // ==========================================

    /// 解析数值（千分位为 "." 或空格，小数点为 ","）
    ///
    /// # 逗号判定
    /// - 最后一个逗号后 ≤2 位 → 小数点
    /// - 否则 → 千分位
    pub fn parse_number(&self, raw: &str) -> Option<f64> {
        let filtered: String = raw
            .chars()
            .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
            .collect();
        let mut value = filtered.as_str();
        for suffix in [",-", ".-"] {
            if let Some(stripped) = value.strip_suffix(suffix) {
                value = stripped;
            }
        }
        if !value.chars().any(|c| c.is_ascii_digit()) {
            return None;
        }

        let normalized = if let Some(pos) = value.rfind(',') {
            let (head, tail) = (&value[..pos], &value[pos + 1..]);
            let head = head.replace(['.', ','], "");
            if self.locale.comma_is_decimal(tail) {
                format!("{}.{}", head, tail)
            } else {
                format!("{}{}", head, tail)
            }
        } else if self.locale.dot_is_grouping(value) {
            value.replace('.', "")
        } else {
            value.to_string()
        };

        let parsed: f64 = normalized.trim_end_matches('.').parse().ok()?;
        parsed.is_finite().then_some(parsed)
    }

    /// 解析金额并四舍五入到整数单位
    pub fn parse_money(&self, raw: &str) -> Option<i64> {
        self.parse_number(raw).map(|v| v.round() as i64)
    }

    /// 解析非负计数（年龄、人数等）
    pub fn parse_count(&self, raw: &str) -> Option<u32> {
        self.parse_number(raw)
            .filter(|v| *v >= 0.0 && *v <= u32::MAX as f64)
            .map(|v| v.round() as u32)
    }

    // ==========================================
    // 时长
    // ==========================================

    /// 解析时长为分钟
    ///
    /// # 支持格式
    /// - "N min" / "N"（无单位按分钟）
    /// - "N h"（可带小数逗号，如 "1,5 h"）
    /// - "H:MM"
    /// - 组合写法 "1 h 30 min"
    pub fn parse_duration(raw: &str) -> Option<u32> {
        let value = raw.trim().to_lowercase();
        if value.is_empty() {
            return None;
        }

        if let Some(caps) = DURATION_CLOCK.as_ref().and_then(|re| re.captures(&value)) {
            let hours: u32 = caps.get(1)?.as_str().parse().ok()?;
            let minutes: u32 = caps.get(2)?.as_str().parse().ok()?;
            return Some(hours * 60 + minutes);
        }

        let re = DURATION_PART.as_ref()?;
        let mut total = 0.0_f64;
        let mut matched = false;
        for caps in re.captures_iter(&value) {
            let amount: f64 = caps.get(1)?.as_str().replace(',', ".").parse().ok()?;
            let factor = match caps.get(2).map(|m| m.as_str()) {
                Some(unit) if unit.starts_with('h') => 60.0,
                _ => 1.0,
            };
            total += amount * factor;
            matched = true;
        }

        if !matched || total <= 0.0 || total > u32::MAX as f64 {
            return None;
        }
        Some(total.round() as u32)
    }

    // ==========================================
    // GPS
    // ==========================================

    /// 解析 "lat, lon" 十进制坐标，支持 N/S/E/W 半球字母
    pub fn parse_gps(raw: &str) -> Option<GpsPoint> {
        let value = raw.trim();
        if value.is_empty() {
            return None;
        }

        let parts: Vec<&str> = if value.contains(';') {
            value.split(';').collect()
        } else if value.contains(", ") {
            value.split(", ").collect()
        } else if value.matches(',').count() == 1 {
            value.split(',').collect()
        } else {
            value.split_whitespace().collect()
        };
        if parts.len() != 2 {
            return None;
        }

        let (a, a_axis) = parse_coordinate(parts[0])?;
        let (b, b_axis) = parse_coordinate(parts[1])?;

        let (lat, lon) = match (a_axis, b_axis) {
            (Some(Axis::Longitude), _) | (_, Some(Axis::Latitude)) => (b, a),
            _ => (a, b),
        };

        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return None;
        }
        Some(GpsPoint { lat, lon })
    }

    // ==========================================
    // 姓名
    // ==========================================

    /// 拆分全名为 (名, 姓)
    ///
    /// - 1 个词 → 仅名
    /// - 2 个词 → 按常见名判断顺序，无法判断时按 "名 姓"
    /// - 3 个及以上 → 最后一个词为姓，其余为名
    pub fn split_name(&self, raw: &str) -> (Option<String>, Option<String>) {
        let tokens: Vec<&str> = raw.split_whitespace().collect();
        match tokens.as_slice() {
            [] => (None, None),
            [only] => (Some(only.to_string()), None),
            [a, b] => {
                if !self.locale.is_common_first_name(a) && self.locale.is_common_first_name(b) {
                    (Some(b.to_string()), Some(a.to_string()))
                } else {
                    (Some(a.to_string()), Some(b.to_string()))
                }
            }
            [given @ .., last] => (Some(given.join(" ")), Some(last.to_string())),
        }
    }

    // ==========================================
    // 文本
    // ==========================================

    /// 生成 URL slug（折叠变音符号后转 kebab-case）
    pub fn slugify(raw: &str) -> String {
        let folded: String = raw.to_lowercase().chars().map(fold_diacritic).collect();
        folded.to_kebab_case()
    }

    /// 将长文本拆分为段落与列表项
    pub fn rich_text_blocks(raw: &str) -> Vec<RichTextBlock> {
        let mut blocks = Vec::new();
        let mut paragraph: Vec<&str> = Vec::new();

        for line in raw.lines().map(str::trim) {
            if line.is_empty() {
                flush_paragraph(&mut paragraph, &mut blocks);
                continue;
            }

            let bullet = ['-', '*', '•']
                .iter()
                .find_map(|marker| line.strip_prefix(*marker));
            match bullet {
                Some(text) => {
                    flush_paragraph(&mut paragraph, &mut blocks);
                    let text = text.trim();
                    if !text.is_empty() {
                        blocks.push(RichTextBlock {
                            kind: BlockKind::BulletItem,
                            text: text.to_string(),
                        });
                    }
                }
                None => paragraph.push(line),
            }
        }
        flush_paragraph(&mut paragraph, &mut blocks);

        blocks
    }

    /// 邮箱: 去空白、转小写、校验形状
    pub fn normalize_email(raw: &str) -> Option<String> {
        let value = raw.trim().to_lowercase();
        patterns::is_match(&EMAIL, &value).then_some(value)
    }

    /// 布尔: ano/ne、yes/no、1/0、true/false
    pub fn parse_bool(raw: &str) -> Option<bool> {
        match raw.trim().to_lowercase().as_str() {
            "ano" | "a" | "yes" | "y" | "1" | "true" | "x" => Some(true),
            "ne" | "n" | "no" | "0" | "false" => Some(false),
            _ => None,
        }
    }

    /// 生成占位邮箱
    ///
    /// - 有公司识别号: 由识别号确定，重复导入稳定
    /// - 无识别号: 以时钟毫秒 + 行号生成，不可复现
    pub fn placeholder_email(ico: Option<&str>, row_index: usize, clock: &dyn Clock) -> String {
        match ico {
            Some(ico) if !ico.is_empty() => {
                format!("import-{}@{}", ico, PLACEHOLDER_EMAIL_DOMAIN)
            }
            _ => format!(
                "import-{}-{}@{}",
                clock.timestamp_millis(),
                row_index,
                PLACEHOLDER_EMAIL_DOMAIN
            ),
        }
    }
}

// ==========================================
// 内部工具
// ==========================================

fn is_digits(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit())
}

fn flush_paragraph(paragraph: &mut Vec<&str>, blocks: &mut Vec<RichTextBlock>) {
    if !paragraph.is_empty() {
        blocks.push(RichTextBlock {
            kind: BlockKind::Paragraph,
            text: paragraph.join(" "),
        });
        paragraph.clear();
    }
}

fn group_digits(digits: &str, size: usize) -> String {
    digits
        .as_bytes()
        .chunks(size)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Latitude,
    Longitude,
}

fn parse_coordinate(raw: &str) -> Option<(f64, Option<Axis>)> {
    let mut value = raw.trim().to_uppercase().replace('°', "");
    let mut sign = 1.0;
    let mut axis = None;

    for (letter, axis_kind, letter_sign) in [
        ('N', Axis::Latitude, 1.0),
        ('S', Axis::Latitude, -1.0),
        ('E', Axis::Longitude, 1.0),
        ('W', Axis::Longitude, -1.0),
    ] {
        if value.starts_with(letter) || value.ends_with(letter) {
            value = value.trim_matches(letter).trim().to_string();
            sign = letter_sign;
            axis = Some(axis_kind);
            break;
        }
    }

    let number: f64 = value.replace(',', ".").parse().ok()?;
    number.is_finite().then_some((number * sign, axis))
}

fn fold_diacritic(c: char) -> char {
    match c {
        'á' | 'ä' | 'à' | 'â' => 'a',
        'č' | 'ç' => 'c',
        'ď' => 'd',
        'é' | 'ě' | 'ë' | 'è' => 'e',
        'í' | 'ï' => 'i',
        'ĺ' | 'ľ' => 'l',
        'ň' => 'n',
        'ó' | 'ô' | 'ö' => 'o',
        'ř' | 'ŕ' => 'r',
        'š' => 's',
        'ť' => 't',
        'ú' | 'ů' | 'ü' => 'u',
        'ý' => 'y',
        'ž' => 'z',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::clock::FixedClock;

    fn tf() -> FieldTransformer {
        FieldTransformer::default()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_date_formats() {
        let t = tf();
        assert_eq!(t.parse_date("5.3.24"), Some(date(2024, 3, 5)));
        assert_eq!(t.parse_date("2024-03-05"), Some(date(2024, 3, 5)));
        assert_eq!(t.parse_date("05.03.2024"), Some(date(2024, 3, 5)));
        assert_eq!(t.parse_date(" 5. 3. 2024 "), Some(date(2024, 3, 5)));
        assert_eq!(t.parse_date("1.1.75"), Some(date(1975, 1, 1)));
        assert_eq!(t.parse_date("31.2.2024"), None);
        assert_eq!(t.parse_date("zítra"), None);
        assert_eq!(t.parse_date(""), None);
    }

    #[test]
    fn test_normalize_phone() {
        let t = tf();
        assert_eq!(
            t.normalize_phone("777 123 456"),
            Some("+420 777 123 456".to_string())
        );
        assert_eq!(
            t.normalize_phone("+420777123456"),
            Some("+420 777 123 456".to_string())
        );
        assert_eq!(
            t.normalize_phone("00420 777-123-456"),
            Some("+420 777 123 456".to_string())
        );
        assert_eq!(
            t.normalize_phone("0777123456"),
            Some("+420 777 123 456".to_string())
        );
        assert_eq!(t.normalize_phone("+49 30 1234567"), Some("+49301234567".to_string()));
        assert_eq!(t.normalize_phone("12345"), None);
        assert_eq!(t.normalize_phone("n/a"), None);
    }

    #[test]
    fn test_tax_ids() {
        let t = tf();
        assert_eq!(FieldTransformer::normalize_ico("12345678"), Some("12345678".to_string()));
        assert_eq!(FieldTransformer::normalize_ico("2345678"), Some("02345678".to_string()));
        assert_eq!(FieldTransformer::normalize_ico("123456789"), None);
        assert_eq!(FieldTransformer::normalize_ico("12A45678"), None);

        assert_eq!(t.normalize_dic("CZ12345678"), Some("CZ12345678".to_string()));
        assert_eq!(t.normalize_dic("cz 1234567890"), Some("CZ1234567890".to_string()));
        assert_eq!(t.normalize_dic("12345678"), Some("CZ12345678".to_string()));
        assert_eq!(t.normalize_dic("CZ1234"), None);
    }

    #[test]
    fn test_parse_money() {
        let t = tf();
        assert_eq!(t.parse_money("5 000,00 CZK"), Some(5000));
        assert_eq!(t.parse_money("2500.000 Kč"), Some(2500));
        assert_eq!(t.parse_money("2.500"), Some(2500));
        assert_eq!(t.parse_money("1.234,50"), Some(1235));
        assert_eq!(t.parse_money("1,500"), Some(1500));
        assert_eq!(t.parse_money("999,-"), Some(999));
        assert_eq!(t.parse_money("zdarma"), None);
        assert_eq!(t.parse_number("21 %"), Some(21.0));
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(FieldTransformer::parse_duration("45 min"), Some(45));
        assert_eq!(FieldTransformer::parse_duration("2 h"), Some(120));
        assert_eq!(FieldTransformer::parse_duration("1,5 h"), Some(90));
        assert_eq!(FieldTransformer::parse_duration("1:30"), Some(90));
        assert_eq!(FieldTransformer::parse_duration("1 h 15 min"), Some(75));
        assert_eq!(FieldTransformer::parse_duration("60"), Some(60));
        assert_eq!(FieldTransformer::parse_duration("dlouho"), None);
    }

    #[test]
    fn test_parse_gps() {
        let p = FieldTransformer::parse_gps("50.0755, 14.4378").unwrap();
        assert!((p.lat - 50.0755).abs() < 1e-9 && (p.lon - 14.4378).abs() < 1e-9);

        let p = FieldTransformer::parse_gps("14.4378E; 50.0755N").unwrap();
        assert!((p.lat - 50.0755).abs() < 1e-9);

        let p = FieldTransformer::parse_gps("33.9 S, 18.4 E").unwrap();
        assert!(p.lat < 0.0);

        assert!(FieldTransformer::parse_gps("95.0, 14.0").is_none());
        assert!(FieldTransformer::parse_gps("Praha").is_none());
    }

    #[test]
    fn test_split_name() {
        let t = tf();
        assert_eq!(t.split_name("Jan"), (Some("Jan".to_string()), None));
        assert_eq!(
            t.split_name("Novák Jan"),
            (Some("Jan".to_string()), Some("Novák".to_string()))
        );
        assert_eq!(
            t.split_name("Jan Novák"),
            (Some("Jan".to_string()), Some("Novák".to_string()))
        );
        assert_eq!(
            t.split_name("Xaver Yberg"),
            (Some("Xaver".to_string()), Some("Yberg".to_string()))
        );
        assert_eq!(
            t.split_name("Jan Maria Novák"),
            (Some("Jan Maria".to_string()), Some("Novák".to_string()))
        );
        assert_eq!(t.split_name("   "), (None, None));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(FieldTransformer::slugify("Pirátská výprava"), "piratska-vyprava");
        assert_eq!(FieldTransformer::slugify("Čarodějnické řádění 2"), "carodejnicke-radeni-2");
    }

    #[test]
    fn test_rich_text_blocks() {
        let blocks = FieldTransformer::rich_text_blocks(
            "Veselé představení\npro celou rodinu.\n\n- kouzla\n• balónky\n\nKonec",
        );
        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[0].text, "Veselé představení pro celou rodinu.");
        assert_eq!(blocks[1].kind, BlockKind::BulletItem);
        assert_eq!(blocks[2].text, "balónky");
        assert_eq!(blocks[3].kind, BlockKind::Paragraph);
    }

    #[test]
    fn test_email_and_bool() {
        assert_eq!(
            FieldTransformer::normalize_email(" Jan@Firma.CZ "),
            Some("jan@firma.cz".to_string())
        );
        assert_eq!(FieldTransformer::normalize_email("bez zavináče"), None);
        assert_eq!(FieldTransformer::parse_bool("Ano"), Some(true));
        assert_eq!(FieldTransformer::parse_bool("0"), Some(false));
        assert_eq!(FieldTransformer::parse_bool("možná"), None);
    }

    #[test]
    fn test_placeholder_email() {
        let clock = FixedClock::new(date(2024, 1, 1), 1_700_000_000_000);
        assert_eq!(
            FieldTransformer::placeholder_email(Some("12345678"), 3, &clock),
            "import-12345678@noemail.invalid"
        );
        assert_eq!(
            FieldTransformer::placeholder_email(None, 3, &clock),
            "import-1700000000000-3@noemail.invalid"
        );
    }
}
