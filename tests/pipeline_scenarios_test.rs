// ==========================================
// 导入管道端到端场景测试
// ==========================================
// 覆盖: 解析 → 建议映射 → 校验 → 试运行 → 正式执行
// 存储: InMemoryRecordStore（无数据库依赖）
// ==========================================


use chrono::NaiveDate;
use suite_import::domain::Severity;
use suite_import::importer::{mapper_for, FieldTransformer, ParseOptions, ProjectionContext};
use suite_import::{
    EntityType, ImportExecutor, ImportOptions, InMemoryRecordStore, RecordStore, TableParser,
    Validator,
};
use test_helpers::*;

// ==========================================
// 场景 1: IČ 列精确匹配并通过校验
// ==========================================
#[test]
fn test_company_ico_header_maps_and_validates() {
    println!("\n=== 场景 1: 公司 IČ 列映射 ===");

    let bytes = "Název;IČ\nFirma a.s.;12345678\n".as_bytes();
    let table = TableParser::parse(bytes, &ParseOptions::default()).expect("解析失败");
    assert_eq!(table.headers, vec!["Název", "IČ"]);

    println!("步骤 1: 建议映射");
    let mapper = mapper_for(EntityType::CustomerCompany);
    let mapping = mapper.suggest(&table.headers);
    assert_eq!(mapping.target_of("IČ"), Some("ico"));
    assert_eq!(mapping.target_of("Název"), Some("name"));

    println!("步骤 2: 校验");
    let transformer = FieldTransformer::default();
    let outcome = Validator::new(mapper, &transformer).validate(&table.rows, &mapping);
    assert_eq!(outcome.valid_rows, vec![0]);
    assert!(outcome.errors.is_empty());
    assert!(outcome.warnings.is_empty());
    assert!(outcome.can_import);

    println!("✓ 场景 1 通过");
}

// ==========================================
// 场景 2: 两位年份与 ISO 日期解析为同一天
// ==========================================
#[test]
fn test_short_year_and_iso_dates_agree() {
    let transformer = FieldTransformer::default();
    let expected = NaiveDate::from_ymd_opt(2024, 3, 5);

    assert_eq!(transformer.parse_date("5.3.24"), expected);
    assert_eq!(transformer.parse_date("2024-03-05"), expected);
    assert_eq!(transformer.parse_date("05.03.2024"), expected);
}

// ==========================================
// 场景 3: 必填字段为空的行被判为无效
// ==========================================
#[test]
fn test_empty_required_field_marks_row_invalid() {
    println!("\n=== 场景 3: 必填字段为空 ===");

    let rows = raw_rows(
        INVOICE_HEADERS,
        &[
            &["FV-101", "Alfa", "1.1.2024", "100"],
            &["", "Beta", "2.1.2024", "200"],
            &["FV-103", "Gama", "3.1.2024", "300"],
        ],
    );
    let mapper = mapper_for(EntityType::Invoice);
    let mapping = mapper.suggest(
        &INVOICE_HEADERS
            .iter()
            .map(|h| h.to_string())
            .collect::<Vec<_>>(),
    );

    let transformer = FieldTransformer::default();
    let outcome = Validator::new(mapper, &transformer).validate(&rows, &mapping);

    assert_eq!(outcome.invalid_rows, vec![1]);
    assert_eq!(outcome.valid_rows, vec![0, 2]);
    assert!(!outcome.can_import);
    assert!(!outcome.can_import_with_skip);

    let issue = &outcome.errors[0];
    assert_eq!(issue.row_index, 1);
    assert_eq!(issue.field, "invoice_number");
    assert_eq!(issue.severity, Severity::Error);

    println!("✓ 场景 3 通过");
}

// ==========================================
// 场景 4: 试运行与正式运行计数一致
// ==========================================
#[tokio::test]
async fn test_dry_run_then_real_run_with_skip_existing() {
    println!("\n=== 场景 4: 试运行 + 正式运行 ===");

    let store = InMemoryRecordStore::new();
    store
        .seed(project(
            EntityType::Invoice,
            &[("invoice_number", "FV-003"), ("total", "2500")],
        ))
        .expect("预置失败");
    assert_eq!(store.len(), 1);

    let rows = raw_rows(INVOICE_HEADERS, INVOICE_CELLS);
    let mapping = mapping(&[
        ("Číslo faktury", "invoice_number"),
        ("Odběratel", "customer_name"),
        ("Datum splatnosti", "due_date"),
        ("Celkem", "total"),
    ]);

    let mapper = mapper_for(EntityType::Invoice);
    let transformer = FieldTransformer::default();
    let clock = fixed_clock();

    println!("步骤 1: 校验并检测已存在记录");
    let validator = Validator::new(mapper, &transformer);
    let mut outcome = validator.validate(&rows, &mapping);
    let ctx = ProjectionContext {
        transformer: &transformer,
        clock: clock.as_ref(),
    };
    let existing = validator
        .detect_existing(&rows, &mapping, &outcome, &store, &ctx)
        .await
        .expect("检测失败");
    outcome.attach_existing(existing);
    assert_eq!(outcome.existing.len(), 1);
    assert_eq!(outcome.existing[0].row_index, 2);
    assert!(!outcome.can_import);
    assert!(outcome.can_import_with_skip);

    let options = ImportOptions {
        skip_existing: true,
        dry_run: true,
        ..ImportOptions::default()
    };

    println!("步骤 2: 试运行");
    let executor = ImportExecutor::new(
        mapper,
        &store,
        ProjectionContext {
            transformer: &transformer,
            clock: clock.as_ref(),
        },
    );
    let dry = executor.execute(&rows, &mapping, options).await;
    assert!(dry.dry_run);
    assert_eq!((dry.created, dry.skipped, dry.updated), (4, 1, 0));
    assert!(dry.failures.is_empty());
    assert_eq!(store.len(), 1, "试运行不应写入存储");

    println!("步骤 3: 正式运行");
    let real = executor
        .execute(
            &rows,
            &mapping,
            ImportOptions {
                dry_run: false,
                ..options
            },
        )
        .await;
    assert!(!real.dry_run);
    assert!(real.same_counts(&dry));
    assert_eq!(store.len(), 5);
    assert_eq!(
        store.count(EntityType::Invoice).await.expect("计数失败"),
        5
    );
    assert_ne!(dry.run_id, real.run_id);

    println!("✓ 场景 4 通过");
}

// ==========================================
// 场景 5: 金额解析
// ==========================================
#[test]
fn test_money_cells_parse_to_whole_amounts() {
    let transformer = FieldTransformer::default();

    assert_eq!(transformer.parse_money("5 000,00 CZK"), Some(5000));
    assert_eq!(transformer.parse_money("2500.000 Kč"), Some(2500));
    assert_eq!(transformer.parse_money("1 210,00 Kč"), Some(1210));
}

// ==========================================
// 冲突策略: 未指定策略时已存在记录计为失败
// ==========================================
#[tokio::test]
async fn test_collision_without_strategy_fails_row_only() {
    let store = InMemoryRecordStore::new();
    store
        .seed(project(
            EntityType::Invoice,
            &[("invoice_number", "FV-001"), ("total", "10")],
        ))
        .expect("预置失败");

    let rows = raw_rows(INVOICE_HEADERS, INVOICE_CELLS);
    let mapping = mapping(&[("Číslo faktury", "invoice_number"), ("Celkem", "total")]);
    let transformer = FieldTransformer::default();
    let clock = fixed_clock();
    let executor = ImportExecutor::new(
        mapper_for(EntityType::Invoice),
        &store,
        ProjectionContext {
            transformer: &transformer,
            clock: clock.as_ref(),
        },
    );

    let result = executor
        .execute(&rows, &mapping, ImportOptions::default())
        .await;

    assert_eq!(result.created, 4);
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].row_index, 0);
    assert_eq!(result.processed(), 5);
}

// ==========================================
// 冲突策略: update_existing 原地更新
// ==========================================
#[tokio::test]
async fn test_update_existing_overwrites_in_place() {
    let store = InMemoryRecordStore::new();
    let id = store
        .seed(project(
            EntityType::Invoice,
            &[("invoice_number", "FV-002"), ("total", "1")],
        ))
        .expect("预置失败");

    let rows = raw_rows(INVOICE_HEADERS, INVOICE_CELLS);
    let mapping = mapping(&[("Číslo faktury", "invoice_number"), ("Celkem", "total")]);
    let transformer = FieldTransformer::default();
    let clock = fixed_clock();
    let executor = ImportExecutor::new(
        mapper_for(EntityType::Invoice),
        &store,
        ProjectionContext {
            transformer: &transformer,
            clock: clock.as_ref(),
        },
    );

    let result = executor
        .execute(
            &rows,
            &mapping,
            ImportOptions {
                update_existing: true,
                skip_existing: true,
                dry_run: false,
            },
        )
        .await;

    assert_eq!((result.created, result.updated, result.skipped), (4, 1, 0));
    assert_eq!(store.len(), 5);

    let updated = store.get(&id).expect("记录应存在");
    assert_eq!(updated, project(EntityType::Invoice, &[("invoice_number", "FV-002"), ("total", "5 000")]));
}

// ==========================================
// 订单: 两个不同文件的订单互不冲突
// ==========================================
#[tokio::test]
async fn test_second_order_file_creates_its_own_orders() {
    println!("\n=== 订单: 跨文件导入 ===");

    let headers = &["Datum akce", "Zákazník", "Místo konání"];
    let file_a = raw_rows(
        headers,
        &[
            &["12.10.2024", "MŠ Sluníčko", "Brno"],
            &["19.10.2024", "ZŠ Lipová", "Praha 9"],
        ],
    );
    let file_b = raw_rows(
        headers,
        &[
            &["2.11.2024", "Rodina Novákových", "Kolín"],
            &["9.11.2024", "Hasiči Kbely", "Praha 19"],
        ],
    );
    let mapping = mapping(&[
        ("Datum akce", "event_date"),
        ("Zákazník", "customer_name"),
        ("Místo konání", "venue"),
    ]);

    let store = InMemoryRecordStore::new();
    let transformer = FieldTransformer::default();
    let clock = fixed_clock();
    let executor = ImportExecutor::new(
        mapper_for(EntityType::Order),
        &store,
        ProjectionContext {
            transformer: &transformer,
            clock: clock.as_ref(),
        },
    );

    println!("步骤 1: 导入文件 A");
    let first = executor
        .execute(&file_a, &mapping, ImportOptions::default())
        .await;
    assert_eq!(first.created, 2);

    println!("步骤 2: 以 skip_existing 导入文件 B");
    let skip = ImportOptions {
        skip_existing: true,
        ..ImportOptions::default()
    };
    let second = executor.execute(&file_b, &mapping, skip).await;
    assert_eq!((second.created, second.skipped, second.updated), (2, 0, 0));
    assert_eq!(store.len(), 4);

    println!("步骤 3: 重新导入文件 A，全部识别为已存在");
    let again = executor
        .execute(
            &file_a,
            &mapping,
            ImportOptions {
                update_existing: true,
                ..ImportOptions::default()
            },
        )
        .await;
    assert_eq!((again.created, again.updated), (0, 2));
    assert_eq!(store.len(), 4);

    println!("✓ 跨文件订单导入通过");
}
