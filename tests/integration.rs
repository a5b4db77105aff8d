use std::collections::HashMap;

use shoal::{execute_query, ShoalError, Table, Value};

/// A cut of the classic tips dataset: 8 Dinner rows, 4 Lunch rows,
/// 7 Male / 5 Female, party sizes summing to 33.
fn tips() -> Table {
    let columns = vec![
        "total_bill".to_string(),
        "tip".to_string(),
        "sex".to_string(),
        "smoker".to_string(),
        "day".to_string(),
        "time".to_string(),
        "size".to_string(),
    ];
    let data: Vec<(f64, f64, &str, &str, &str, &str, i64)> = vec![
        (16.99, 1.01, "Female", "No", "Sun", "Dinner", 2),
        (10.34, 1.66, "Male", "No", "Sun", "Dinner", 3),
        (21.01, 3.50, "Male", "No", "Sun", "Dinner", 3),
        (23.68, 3.31, "Male", "No", "Sun", "Dinner", 2),
        (24.59, 3.61, "Female", "No", "Sun", "Dinner", 4),
        (25.29, 4.71, "Male", "No", "Sun", "Dinner", 4),
        (8.77, 2.00, "Male", "No", "Sun", "Dinner", 2),
        (26.88, 3.12, "Male", "No", "Sun", "Dinner", 4),
        (13.42, 1.68, "Female", "Yes", "Thur", "Lunch", 2),
        (16.47, 3.23, "Female", "Yes", "Thur", "Lunch", 3),
        (10.07, 1.25, "Male", "No", "Thur", "Lunch", 2),
        (17.46, 2.54, "Female", "No", "Thur", "Lunch", 2),
    ];
    let rows = data
        .into_iter()
        .map(|(bill, tip, sex, smoker, day, time, size)| {
            vec![
                Value::Real(bill),
                Value::Real(tip),
                Value::Text(sex.into()),
                Value::Text(smoker.into()),
                Value::Text(day.into()),
                Value::Text(time.into()),
                Value::Integer(size),
            ]
        })
        .collect();
    Table::new(columns, rows).unwrap()
}

fn tables() -> HashMap<String, Table> {
    let mut map = HashMap::new();
    map.insert("tips".to_string(), tips());
    map
}

fn query(statement: &str) -> Table {
    execute_query(statement, &tables()).unwrap()
}

// ---------------------------------------------------------------------------
// Passthrough, projection, limit
// ---------------------------------------------------------------------------

#[test]
fn select_star_is_a_pure_passthrough() {
    let result = query("SELECT * FROM tips");
    assert_eq!(result.num_rows(), tips().num_rows());
    assert_eq!(result.num_columns(), tips().num_columns());
}

#[test]
fn select_accepts_a_trailing_semicolon() {
    let result = query("SELECT * FROM tips;");
    assert_eq!(result.num_rows(), 12);
}

#[test]
fn select_is_case_insensitive() {
    let result = query("select * from tips;");
    assert_eq!(result.num_rows(), 12);
}

#[test]
fn select_with_limit() {
    let result = query("SELECT * FROM tips LIMIT 5");
    assert_eq!(result.num_rows(), 5);
    assert_eq!(result.num_columns(), 7);
}

#[test]
fn select_with_limit_is_case_insensitive() {
    let result = query("SELECT * from tips limit 5");
    assert_eq!(result.num_rows(), 5);
}

#[test]
fn limit_zero_and_limit_beyond_rowcount() {
    assert_eq!(query("SELECT * FROM tips LIMIT 0").num_rows(), 0);
    assert_eq!(query("SELECT * FROM tips LIMIT 500").num_rows(), 12);
}

#[test]
fn single_column_selection() {
    let result = query("SELECT sex FROM tips");
    assert_eq!(result.columns(), &["sex".to_string()]);
    assert_eq!(result.num_rows(), 12);
}

#[test]
fn column_selection_preserves_request_order() {
    let result = query("SELECT tip, total_bill FROM tips");
    assert_eq!(
        result.columns(),
        &["tip".to_string(), "total_bill".to_string()]
    );
    assert_eq!(result.num_rows(), 12);
    assert_eq!(result.rows()[0], vec![Value::Real(1.01), Value::Real(16.99)]);
}

#[test]
fn qualified_columns_resolve_without_validating_the_qualifier() {
    let result = query("SELECT tips.sex FROM tips");
    assert_eq!(result.columns(), &["sex".to_string()]);
}

// ---------------------------------------------------------------------------
// WHERE
// ---------------------------------------------------------------------------

#[test]
fn where_equality_on_text() {
    let result = query("SELECT * FROM tips WHERE time = 'Dinner'");
    assert_eq!(result.num_rows(), 8);
    let time = result.column_index("time").unwrap();
    for row in result.rows() {
        assert_eq!(row[time], Value::Text("Dinner".into()));
    }
}

#[test]
fn where_comparisons_select_exact_subsets() {
    assert_eq!(
        query("SELECT * FROM tips WHERE total_bill > 24").num_rows(),
        3
    );
    assert_eq!(
        query("SELECT * FROM tips WHERE total_bill >= 23.68").num_rows(),
        4
    );
    assert_eq!(query("SELECT * FROM tips WHERE size < 3").num_rows(), 6);
    assert_eq!(query("SELECT * FROM tips WHERE size <= 3").num_rows(), 9);
}

#[test]
fn where_and_intersects() {
    let result = query("SELECT * FROM tips WHERE total_bill > 20 AND time = 'Dinner'");
    assert_eq!(result.num_rows(), 5);
}

#[test]
fn where_or_unions() {
    let result = query("SELECT * FROM tips WHERE time = 'Lunch' OR total_bill > 25");
    assert_eq!(result.num_rows(), 6);
}

#[test]
fn where_with_qualified_column() {
    let result = query("SELECT * FROM tips WHERE tips.time = 'Dinner'");
    assert_eq!(result.num_rows(), 8);
}

#[test]
fn where_partitions_rows_by_nullness() {
    let staff = Table::new(
        vec!["name".into(), "manager".into()],
        vec![
            vec![Value::Text("ada".into()), Value::Null],
            vec![Value::Text("brin".into()), Value::Text("ada".into())],
            vec![Value::Text("cole".into()), Value::Text("ada".into())],
        ],
    )
    .unwrap();
    let mut map = HashMap::new();
    map.insert("staff".to_string(), staff);

    let with = execute_query("SELECT * FROM staff WHERE manager IS NOT NULL", &map).unwrap();
    let without = execute_query("SELECT * FROM staff WHERE manager IS NULL", &map).unwrap();
    assert_eq!(with.num_rows(), 2);
    assert_eq!(without.num_rows(), 1);
    assert_eq!(without.rows()[0][0], Value::Text("ada".into()));
}

#[test]
fn filtering_twice_is_idempotent() {
    let first = query("SELECT * FROM tips WHERE time = 'Dinner'");
    let mut map = HashMap::new();
    map.insert("tips".to_string(), first.clone());
    let second = execute_query("SELECT * FROM tips WHERE time = 'Dinner'", &map).unwrap();
    assert_eq!(second, first);
}

// ---------------------------------------------------------------------------
// GROUP BY
// ---------------------------------------------------------------------------

#[test]
fn group_by_count_star() {
    let result = query("SELECT sex, COUNT(*) FROM tips GROUP BY sex");
    assert_eq!(
        result.columns(),
        &["sex".to_string(), "COUNT(*)".to_string()]
    );
    assert_eq!(result.num_rows(), 2);

    let counts: i64 = result
        .rows()
        .iter()
        .map(|row| row[1].as_integer().unwrap())
        .sum();
    assert_eq!(counts, 12);

    // First-appearance order: Female appears in row one of the source.
    assert_eq!(
        result.rows()[0],
        vec![Value::Text("Female".into()), Value::Integer(5)]
    );
    assert_eq!(
        result.rows()[1],
        vec![Value::Text("Male".into()), Value::Integer(7)]
    );
}

#[test]
fn group_by_avg_is_the_group_mean() {
    let result = query("SELECT time, AVG(size) FROM tips GROUP BY time");
    assert_eq!(
        result.columns(),
        &["time".to_string(), "AVG(size)".to_string()]
    );
    assert_eq!(
        result.rows()[0],
        vec![Value::Text("Dinner".into()), Value::Real(3.0)]
    );
    assert_eq!(
        result.rows()[1],
        vec![Value::Text("Lunch".into()), Value::Real(2.25)]
    );
}

#[test]
fn group_by_multiple_columns_uses_distinct_tuples() {
    let result = query("SELECT sex, smoker, COUNT(*) FROM tips GROUP BY sex, smoker");
    assert_eq!(result.num_rows(), 3);
    let counts: i64 = result
        .rows()
        .iter()
        .map(|row| row[2].as_integer().unwrap())
        .sum();
    assert_eq!(counts, 12);
}

#[test]
fn aggregate_without_group_by_reduces_the_whole_table() {
    let result = query("SELECT AVG(size) FROM tips");
    assert_eq!(result.columns(), &["AVG(size)".to_string()]);
    assert_eq!(result.rows(), &[vec![Value::Real(2.75)]]);
}

// ---------------------------------------------------------------------------
// ORDER BY
// ---------------------------------------------------------------------------

#[test]
fn order_by_desc_with_limit_returns_the_top_rows() {
    let result = query("SELECT * FROM tips ORDER BY total_bill DESC LIMIT 3");
    let bills: Vec<&Value> = result.rows().iter().map(|row| &row[0]).collect();
    assert_eq!(
        bills,
        vec![
            &Value::Real(26.88),
            &Value::Real(25.29),
            &Value::Real(24.59)
        ]
    );
}

#[test]
fn order_by_is_stable_for_equal_keys() {
    // Every Dinner row sorts before every Lunch row; within each time the
    // original order must be preserved.
    let result = query("SELECT * FROM tips ORDER BY time");
    let bills: Vec<f64> = result
        .rows()
        .iter()
        .map(|row| row[0].as_real().unwrap())
        .collect();
    assert_eq!(
        bills,
        vec![
            16.99, 10.34, 21.01, 23.68, 24.59, 25.29, 8.77, 26.88, // Dinner
            13.42, 16.47, 10.07, 17.46, // Lunch
        ]
    );
}

#[test]
fn multi_key_order_with_per_key_directions() {
    let result = query("SELECT * FROM tips ORDER BY time DESC, size");
    // Lunch first (descending time), then ascending size with stable ties.
    let first: Vec<f64> = result
        .rows()
        .iter()
        .take(4)
        .map(|row| row[0].as_real().unwrap())
        .collect();
    assert_eq!(first, vec![13.42, 10.07, 17.46, 16.47]);
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[test]
fn missing_table_is_reported_by_name() {
    let result = execute_query("SELECT * FROM receipts", &tables());
    assert!(matches!(
        result,
        Err(ShoalError::TableNotFound(name)) if name == "receipts"
    ));
}

#[test]
fn missing_column_is_reported_by_name() {
    let result = execute_query("SELECT * FROM tips WHERE price > 1", &tables());
    assert!(matches!(
        result,
        Err(ShoalError::ColumnNotFound(name)) if name == "price"
    ));
}

#[test]
fn unknown_aggregate_function_is_rejected() {
    let result = execute_query("SELECT sex, MEDIAN(tip) FROM tips GROUP BY sex", &tables());
    assert!(matches!(result, Err(ShoalError::UnknownFunction(_))));
}

#[test]
fn not_equal_operator_is_rejected() {
    let result = execute_query("SELECT * FROM tips WHERE time != 'Lunch'", &tables());
    assert!(matches!(
        result,
        Err(ShoalError::UnknownComparisonOperator(_))
    ));
}

#[test]
fn dml_other_than_select_is_rejected() {
    let result = execute_query("DELETE FROM tips", &tables());
    assert!(matches!(result, Err(ShoalError::UnexpectedToken { .. })));
}

#[test]
fn source_tables_are_never_mutated() {
    let map = tables();
    let _ = execute_query(
        "SELECT * FROM tips WHERE size > 2 ORDER BY total_bill DESC LIMIT 1",
        &map,
    )
    .unwrap();
    assert_eq!(map["tips"], tips());
}
