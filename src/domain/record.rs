// ==========================================
// 业务管理套件 - 导入目标实体模型
// ==========================================
// 用途: 规范化后的实体记录与自然键
// 用途: EntityMapper 投影结果，ImportExecutor 落库输入
// 约定: 缺失/无法解析的字段一律为 None
// ==========================================

use crate::domain::types::EntityType;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// 值对象
// ==========================================

/// GPS 坐标（十进制度）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsPoint {
    pub lat: f64,
    pub lon: f64,
}

/// 富文本块类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Paragraph,
    BulletItem,
}

/// 富文本块（描述/规则等长文本字段）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichTextBlock {
    pub kind: BlockKind,
    pub text: String,
}

/// 发票状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Issued, // 已开具（未到期）
    Paid,   // 已支付（历史导入按已结清处理）
}

/// 自然键（用于识别已存在记录）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NaturalKey {
    pub field: String,
    pub value: String,
}

impl NaturalKey {
    pub fn new(field: &str, value: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            value: value.into(),
        }
    }
}

// ==========================================
// 各实体结构
// ==========================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerCompany {
    pub name: String,                // 公司名称（硬性自然键，缺失则不产出）
    pub ico: Option<String>,         // 公司识别号（8 位）
    pub dic: Option<String>,         // 增值税号（CZ + 8~10 位）
    pub email: String,               // 缺失时使用占位邮箱
    pub email_is_placeholder: bool,
    pub phone: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
    pub contact_person: Option<String>,
    pub website: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerPerson {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub email_is_placeholder: bool,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub zip: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub invoice_number: String,      // 发票号（硬性自然键）
    pub issue_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub paid_date: Option<NaiveDate>,
    pub customer_name: Option<String>,
    pub customer_ico: Option<String>,
    pub total: Option<i64>,          // 金额（取整到元）
    pub currency: String,
    pub vat_rate: Option<f64>,
    pub variable_symbol: Option<String>,
    pub status: InvoiceStatus,       // 派生: 到期日已过 → Paid
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_number: String,        // 派生: {活动年份}-{序号:04}，仅作文件内参考号
    pub booking_key: String,         // 派生: {活动日期}/{客户 slug}/{地点 slug}，跨文件识别同一预订
    pub event_date: NaiveDate,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub venue: Option<String>,
    pub gps: Option<GpsPoint>,
    pub package: Option<String>,
    pub price: Option<i64>,
    pub duration_minutes: Option<u32>,
    pub children_count: Option<u32>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Performance {
    pub title: String,
    pub slug: String,
    pub description: Vec<RichTextBlock>,
    pub duration_minutes: Option<u32>,
    pub price: Option<i64>,
    pub age_from: Option<u32>,
    pub age_to: Option<u32>,
    pub max_children: Option<u32>,
    pub category: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub title: String,
    pub slug: String,
    pub description: Vec<RichTextBlock>,
    pub rules: Vec<RichTextBlock>,
    pub min_players: Option<u32>,
    pub max_players: Option<u32>,
    pub age_from: Option<u32>,
    pub duration_minutes: Option<u32>,
    pub category: Option<String>,
    pub equipment: Option<String>,
}

// ==========================================
// MappedRecord - 投影产物（标签联合）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "entity", rename_all = "snake_case")]
pub enum MappedRecord {
    CustomerCompany(CustomerCompany),
    CustomerPerson(CustomerPerson),
    Invoice(Invoice),
    Order(Order),
    Performance(Performance),
    Game(Game),
}

impl MappedRecord {
    pub fn entity_type(&self) -> EntityType {
        match self {
            MappedRecord::CustomerCompany(_) => EntityType::CustomerCompany,
            MappedRecord::CustomerPerson(_) => EntityType::CustomerPerson,
            MappedRecord::Invoice(_) => EntityType::Invoice,
            MappedRecord::Order(_) => EntityType::Order,
            MappedRecord::Performance(_) => EntityType::Performance,
            MappedRecord::Game(_) => EntityType::Game,
        }
    }

    /// 自然键（无自然键的记录每次都按新建处理）
    pub fn natural_key(&self) -> Option<NaturalKey> {
        match self {
            MappedRecord::CustomerCompany(c) => {
                c.ico.as_ref().map(|ico| NaturalKey::new("ico", ico.clone()))
            }
            MappedRecord::CustomerPerson(p) => {
                if p.email_is_placeholder {
                    None
                } else {
                    Some(NaturalKey::new("email", p.email.clone()))
                }
            }
            MappedRecord::Invoice(i) => {
                Some(NaturalKey::new("invoice_number", i.invoice_number.clone()))
            }
            MappedRecord::Order(o) => Some(NaturalKey::new("booking_key", o.booking_key.clone())),
            MappedRecord::Performance(p) => Some(NaturalKey::new("slug", p.slug.clone())),
            MappedRecord::Game(g) => Some(NaturalKey::new("slug", g.slug.clone())),
        }
    }

    /// 简短显示名（日志/预览用）
    pub fn display_name(&self) -> String {
        match self {
            MappedRecord::CustomerCompany(c) => c.name.clone(),
            MappedRecord::CustomerPerson(p) => [p.first_name.as_deref(), p.last_name.as_deref()]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(" "),
            MappedRecord::Invoice(i) => i.invoice_number.clone(),
            MappedRecord::Order(o) => o.order_number.clone(),
            MappedRecord::Performance(p) => p.title.clone(),
            MappedRecord::Game(g) => g.title.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(email: &str, placeholder: bool) -> MappedRecord {
        MappedRecord::CustomerPerson(CustomerPerson {
            first_name: Some("Jan".to_string()),
            last_name: Some("Novák".to_string()),
            email: email.to_string(),
            email_is_placeholder: placeholder,
            phone: None,
            birth_date: None,
            street: None,
            city: None,
            zip: None,
            note: None,
        })
    }

    #[test]
    fn test_person_placeholder_email_has_no_natural_key() {
        assert!(person("import-1-0@noemail.invalid", true).natural_key().is_none());
        assert_eq!(
            person("jan@example.cz", false).natural_key(),
            Some(NaturalKey::new("email", "jan@example.cz"))
        );
    }

    #[test]
    fn test_record_serializes_with_entity_tag() {
        let value = serde_json::to_value(person("jan@example.cz", false)).unwrap();
        assert_eq!(value["entity"], "customer_person");
        assert_eq!(value["last_name"], "Novák");
    }

    #[test]
    fn test_display_name_joins_person_parts() {
        assert_eq!(person("a@b.cz", false).display_name(), "Jan Novák");
    }
}
