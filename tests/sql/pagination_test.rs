// tests/sql/pagination_test.rs
use sqlshape::executor::{Executor, Row};
use sqlshape::sql::condition::Condition;
use sqlshape::sql::dialect::Dialect;
use sqlshape::sql::field::{JoinKind, OrderField, QueryField, SortDirection};
use sqlshape::sql::select::{Pagination, Select};
use sqlshape::sql::statement::{Command, Statement};
use sqlshape::sql::value::Value;
use sqlshape::{Error, Result};

fn users(dialect: Dialect) -> Select {
    Select::new(dialect, "Users")
        .columns(["Id", "Name"])
        .order_by_asc("Id")
}

fn sql(select: &Select) -> String {
    select.render(false).unwrap().text
}

#[test]
fn test_rendering_is_idempotent() {
    for dialect in Dialect::ALL {
        let select = users(dialect)
            .filter(Condition::equal("Active", true))
            .page_with_count(10, 3, 95)
            .unwrap();
        let first = select.render(false).unwrap();
        let second = select.render(false).unwrap();
        assert_eq!(first, second, "{} rendered differently twice", dialect);
    }
}

#[test]
fn test_page_window() {
    assert_eq!(
        users(Dialect::MySql).page(25, 4).unwrap().pagination(),
        Pagination::Page { size: 25, index: 4 }
    );
    let window = Pagination::Page { size: 25, index: 4 }.window().unwrap();
    assert_eq!((window.start, window.size), (75, 25));
}

// === Offset-native ===

#[test]
fn test_mysql_limit() {
    assert_eq!(
        sql(&users(Dialect::MySql).top(5).unwrap()),
        "SELECT Id,Name FROM Users ORDER BY Id ASC LIMIT 5"
    );
    assert_eq!(
        sql(&users(Dialect::MySql).page(10, 3).unwrap()),
        "SELECT Id,Name FROM Users ORDER BY Id ASC LIMIT 20,10"
    );
}

#[test]
fn test_postgres_and_sqlite_limit_offset() {
    assert_eq!(
        sql(&users(Dialect::Postgres).page(10, 3).unwrap()),
        "SELECT Id,Name FROM Users ORDER BY Id ASC LIMIT 10 OFFSET 20"
    );
    assert_eq!(
        sql(&users(Dialect::Sqlite).page(10, 1).unwrap()),
        "SELECT Id,Name FROM Users ORDER BY Id ASC LIMIT 10"
    );
    assert_eq!(
        sql(&users(Dialect::Sqlite).limit(7, 3).unwrap()),
        "SELECT Id,Name FROM Users ORDER BY Id ASC LIMIT 3 OFFSET 7"
    );
}

#[test]
fn test_reversed_render() {
    let select = users(Dialect::MySql).top(5).unwrap();
    assert_eq!(
        select.render(true).unwrap().text,
        "SELECT Id,Name FROM Users ORDER BY Id DESC LIMIT 5"
    );
}

// === SQL Server ===

#[test]
fn test_sqlserver_top() {
    assert_eq!(
        sql(&users(Dialect::SqlServer).top(5).unwrap()),
        "SELECT TOP 5 Id,Name FROM Users ORDER BY Id ASC"
    );
    assert_eq!(
        sql(&users(Dialect::SqlServer).distinct().page(5, 1).unwrap()),
        "SELECT DISTINCT TOP 5 Id,Name FROM Users ORDER BY Id ASC"
    );
}

#[test]
fn test_sqlserver_row_number_page() {
    let command = users(Dialect::SqlServer)
        .filter(Condition::equal("Active", true))
        .page(10, 3)
        .unwrap()
        .render(false)
        .unwrap();

    insta::assert_snapshot!(command.text, @"SELECT * FROM (SELECT ROW_NUMBER() OVER(ORDER BY Id ASC) AS PAGE_ROW_NUMBER,Id,Name FROM Users WHERE (Active = @PN_IDX_0)) AS PAGE_TABLE WHERE PAGE_ROW_NUMBER BETWEEN 21 AND 30 ORDER BY PAGE_ROW_NUMBER");
    assert_eq!(command.parameters.len(), 1);
}

#[test]
fn test_sqlserver_row_number_without_order() {
    let select = Select::new(Dialect::SqlServer, "Users").limit(5, 5).unwrap();
    assert_eq!(
        sql(&select),
        "SELECT * FROM (SELECT ROW_NUMBER() OVER(ORDER BY (SELECT NULL)) AS PAGE_ROW_NUMBER,* FROM Users) AS PAGE_TABLE WHERE PAGE_ROW_NUMBER BETWEEN 6 AND 10 ORDER BY PAGE_ROW_NUMBER"
    );
}

// === Oracle ===

#[test]
fn test_oracle_rownum() {
    assert_eq!(
        sql(&users(Dialect::Oracle).top(5).unwrap()),
        "SELECT * FROM (SELECT Id,Name FROM Users ORDER BY Id ASC) WHERE ROWNUM <= 5"
    );
    assert_eq!(
        sql(&users(Dialect::Oracle).page(10, 2).unwrap()),
        "SELECT * FROM (SELECT PAGE_INNER.*,ROWNUM PAGE_ROW_NUMBER FROM (SELECT Id,Name FROM Users ORDER BY Id ASC) PAGE_INNER) WHERE PAGE_ROW_NUMBER BETWEEN 11 AND 20"
    );
}

// === Access (count-dependent) ===

#[test]
fn test_access_first_page_uses_top() {
    assert_eq!(
        sql(&users(Dialect::Access).page(10, 1).unwrap()),
        "SELECT TOP 10 Id,Name FROM Users ORDER BY Id ASC"
    );
}

#[test]
fn test_access_front_half() {
    let select = users(Dialect::Access).page(10, 2).unwrap();
    assert_eq!(
        select.render_with_count(100, false).unwrap().text,
        "SELECT * FROM (SELECT TOP 10 * FROM (SELECT TOP 20 Id,Name FROM Users ORDER BY Id ASC) AS PAGE_INNER ORDER BY Id DESC) AS PAGE_OUTER ORDER BY Id ASC"
    );
}

#[test]
fn test_access_back_half() {
    let select = users(Dialect::Access).page(10, 9).unwrap();
    assert_eq!(
        select.render_with_count(100, false).unwrap().text,
        "SELECT TOP 10 * FROM (SELECT TOP 20 Id,Name FROM Users ORDER BY Id DESC) AS PAGE_INNER ORDER BY Id ASC"
    );
}

#[test]
fn test_access_partial_last_page() {
    let select = users(Dialect::Access).page_with_count(10, 10, 95).unwrap();
    assert_eq!(
        sql(&select),
        "SELECT TOP 5 * FROM (SELECT TOP 5 Id,Name FROM Users ORDER BY Id DESC) AS PAGE_INNER ORDER BY Id ASC"
    );
}

#[test]
fn test_access_page_past_end_is_empty() {
    let select = users(Dialect::Access).page_with_count(10, 11, 100).unwrap();
    assert_eq!(
        sql(&select),
        "SELECT Id,Name FROM Users WHERE (1 = 0) ORDER BY Id ASC"
    );

    let filtered = users(Dialect::Access)
        .filter(Condition::equal("Active", true))
        .page_with_count(10, 5, 12)
        .unwrap();
    assert_eq!(
        sql(&filtered),
        "SELECT Id,Name FROM Users WHERE (Active = @PN_IDX_0) AND (1 = 0) ORDER BY Id ASC"
    );
}

#[test]
fn test_access_needs_count_and_order() {
    let err = users(Dialect::Access).page(10, 2).unwrap().render(false).unwrap_err();
    assert!(matches!(err, Error::UnsupportedByDialect { dialect: "access", .. }));

    let unordered = Select::new(Dialect::Access, "Users").page_with_count(10, 2, 50).unwrap();
    assert!(matches!(unordered.render(false), Err(Error::InvalidPagination(_))));

    let computed = Select::new(Dialect::Access, "Orders")
        .field(QueryField::sum("Total"))
        .order_by(OrderField::new(QueryField::sum("Total"), SortDirection::Desc))
        .page_with_count(10, 2, 50)
        .unwrap();
    assert!(matches!(computed.render(false), Err(Error::InvalidPagination(_))));
}

#[test]
fn test_access_parameters_follow_text_order() {
    let select = users(Dialect::Access)
        .filter(Condition::greater_than("Age", 30))
        .page_with_count(10, 2, 100)
        .unwrap();
    let command = select.render(false).unwrap();

    assert_eq!(
        command.text,
        "SELECT * FROM (SELECT TOP 10 * FROM (SELECT TOP 20 Id,Name FROM Users WHERE (Age > @PN_IDX_0) ORDER BY Id ASC) AS PAGE_INNER ORDER BY Id DESC) AS PAGE_OUTER ORDER BY Id ASC"
    );
    assert_eq!(command.parameters.len(), 1);
    assert_eq!(command.parameters[0].value(), &Value::Int(30));
}

// === Distinct, grouped and joined deep pages ===

fn distinct_names(dialect: Dialect) -> Select {
    Select::new(dialect, "Users")
        .column("Name")
        .distinct()
        .order_by_asc("Name")
}

fn revenue_by_region(dialect: Dialect) -> Select {
    Select::new(dialect, "Orders")
        .column("Region")
        .field(QueryField::sum("Total").with_alias("Revenue"))
        .filter(Condition::equal("Status", "paid"))
        .group_by_column("Region")
        .having(Condition::greater_than("SUM(Total)", 100))
}

fn users_with_city(dialect: Dialect) -> Select {
    Select::new(dialect, "Users")
        .columns(["Users.Name", "Profiles.City"])
        .join(JoinKind::Inner, "Id", "Profiles", "UserId")
        .order_by_asc("Users.Name")
}

#[test]
fn test_sqlserver_distinct_deep_page_ranks_distinct_rows() {
    let select = distinct_names(Dialect::SqlServer).page(10, 3).unwrap();
    assert_eq!(
        sql(&select),
        "SELECT * FROM (SELECT ROW_NUMBER() OVER(ORDER BY Name ASC) AS PAGE_ROW_NUMBER,PAGE_SRC.* FROM (SELECT DISTINCT Name FROM Users) AS PAGE_SRC) AS PAGE_TABLE WHERE PAGE_ROW_NUMBER BETWEEN 21 AND 30 ORDER BY PAGE_ROW_NUMBER"
    );

    // The first page needs no ranking.
    assert_eq!(
        sql(&distinct_names(Dialect::SqlServer).page(10, 1).unwrap()),
        "SELECT DISTINCT TOP 10 Name FROM Users ORDER BY Name ASC"
    );
}

#[test]
fn test_sqlserver_grouped_deep_page() {
    let command = revenue_by_region(Dialect::SqlServer)
        .order_by_desc("Revenue")
        .page(5, 2)
        .unwrap()
        .render(false)
        .unwrap();

    insta::assert_snapshot!(command.text, @"SELECT * FROM (SELECT ROW_NUMBER() OVER(ORDER BY Revenue DESC) AS PAGE_ROW_NUMBER,PAGE_SRC.* FROM (SELECT Region,SUM(Total) AS Revenue FROM Orders WHERE (Status = @PN_IDX_0) GROUP BY Region HAVING (SUM(Total) > @PN_IDX_1)) AS PAGE_SRC) AS PAGE_TABLE WHERE PAGE_ROW_NUMBER BETWEEN 6 AND 10 ORDER BY PAGE_ROW_NUMBER");
    let values: Vec<_> = command.parameters.iter().map(|p| p.value().clone()).collect();
    assert_eq!(values, [Value::from("paid"), Value::Int(100)]);
}

#[test]
fn test_sqlserver_grouped_deep_page_needs_named_order() {
    let select = revenue_by_region(Dialect::SqlServer)
        .order_by(OrderField::new(QueryField::sum("Total"), SortDirection::Desc))
        .page(5, 2)
        .unwrap();
    assert!(matches!(select.render(false), Err(Error::InvalidPagination(_))));
}

#[test]
fn test_sqlserver_joined_deep_page() {
    assert_eq!(
        sql(&users_with_city(Dialect::SqlServer).page(10, 2).unwrap()),
        "SELECT * FROM (SELECT ROW_NUMBER() OVER(ORDER BY Users.Name ASC) AS PAGE_ROW_NUMBER,Users.Name,Profiles.City FROM Users INNER JOIN Profiles ON Users.Id = Profiles.UserId) AS PAGE_TABLE WHERE PAGE_ROW_NUMBER BETWEEN 11 AND 20 ORDER BY PAGE_ROW_NUMBER"
    );
}

#[test]
fn test_oracle_distinct_and_grouped_deep_pages() {
    assert_eq!(
        sql(&distinct_names(Dialect::Oracle).page(10, 3).unwrap()),
        "SELECT * FROM (SELECT PAGE_INNER.*,ROWNUM PAGE_ROW_NUMBER FROM (SELECT DISTINCT Name FROM Users ORDER BY Name ASC) PAGE_INNER) WHERE PAGE_ROW_NUMBER BETWEEN 21 AND 30"
    );

    let grouped = revenue_by_region(Dialect::Oracle)
        .order_by_desc("Revenue")
        .page(5, 2)
        .unwrap();
    assert_eq!(
        sql(&grouped),
        "SELECT * FROM (SELECT PAGE_INNER.*,ROWNUM PAGE_ROW_NUMBER FROM (SELECT Region,SUM(Total) AS Revenue FROM Orders WHERE (Status = :PN_IDX_0) GROUP BY Region HAVING (SUM(Total) > :PN_IDX_1) ORDER BY Revenue DESC) PAGE_INNER) WHERE PAGE_ROW_NUMBER BETWEEN 6 AND 10"
    );
}

#[test]
fn test_access_distinct_deep_page() {
    let select = distinct_names(Dialect::Access).page_with_count(10, 2, 100).unwrap();
    assert_eq!(
        sql(&select),
        "SELECT * FROM (SELECT TOP 10 * FROM (SELECT DISTINCT TOP 20 Name FROM Users ORDER BY Name ASC) AS PAGE_INNER ORDER BY Name DESC) AS PAGE_OUTER ORDER BY Name ASC"
    );
}

#[test]
fn test_access_grouped_deep_page() {
    let select = revenue_by_region(Dialect::Access)
        .order_by_asc("Region")
        .page_with_count(5, 4, 18)
        .unwrap();
    let command = select.render(false).unwrap();
    assert_eq!(
        command.text,
        "SELECT TOP 3 * FROM (SELECT TOP 3 Region,SUM(Total) AS Revenue FROM Orders WHERE (Status = @PN_IDX_0) GROUP BY Region HAVING (SUM(Total) > @PN_IDX_1) ORDER BY Region DESC) AS PAGE_INNER ORDER BY Region ASC"
    );
    assert_eq!(command.parameters.len(), 2);
}

#[test]
fn test_access_joined_deep_page_orders_by_output_name() {
    let select = users_with_city(Dialect::Access).page_with_count(10, 2, 100).unwrap();
    assert_eq!(
        sql(&select),
        "SELECT * FROM (SELECT TOP 10 * FROM (SELECT TOP 20 Users.Name,Profiles.City FROM Users INNER JOIN Profiles ON Users.Id = Profiles.UserId ORDER BY Users.Name ASC) AS PAGE_INNER ORDER BY Name DESC) AS PAGE_OUTER ORDER BY Name ASC"
    );
}

#[test]
fn test_deep_page_order_must_be_projected() {
    let access = Select::new(Dialect::Access, "Users")
        .column("Name")
        .order_by_asc("Id")
        .page_with_count(10, 8, 100)
        .unwrap();
    assert!(matches!(access.render(false), Err(Error::InvalidPagination(_))));

    let sqlserver = Select::new(Dialect::SqlServer, "Users")
        .column("Name")
        .distinct()
        .order_by_asc("Id")
        .page(10, 2)
        .unwrap();
    assert!(matches!(sqlserver.render(false), Err(Error::InvalidPagination(_))));

    // `*` projects every column.
    let all = Select::new(Dialect::Access, "Users")
        .order_by_asc("Id")
        .page_with_count(10, 8, 100)
        .unwrap();
    assert_eq!(
        sql(&all),
        "SELECT TOP 10 * FROM (SELECT TOP 30 * FROM Users ORDER BY Id DESC) AS PAGE_INNER ORDER BY Id ASC"
    );
}

#[test]
fn test_zero_sized_windows_are_rejected() {
    assert!(matches!(
        users(Dialect::MySql).top(0),
        Err(Error::InvalidPagination(_))
    ));
    assert!(matches!(
        users(Dialect::Postgres).limit(10, 0),
        Err(Error::InvalidPagination(_))
    ));
}

/// Answers COUNT queries with a fixed scalar and records everything.
struct CountingExecutor {
    count: i64,
    commands: Vec<String>,
}

impl Executor for CountingExecutor {
    fn query(&mut self, command: &Command) -> Result<Vec<Row>> {
        self.commands.push(command.text.clone());
        Ok(vec![[("Id", Value::Int(11))].into_iter().collect()])
    }

    fn scalar(&mut self, command: &Command) -> Result<Value> {
        self.commands.push(command.text.clone());
        Ok(Value::Int(self.count))
    }

    fn execute(&mut self, command: &Command) -> Result<u64> {
        self.commands.push(command.text.clone());
        Ok(0)
    }
}

#[test]
fn test_access_query_rows_counts_first() {
    let mut executor = CountingExecutor {
        count: 100,
        commands: Vec::new(),
    };
    let select = users(Dialect::Access)
        .filter(Condition::equal("Active", true))
        .page(10, 2)
        .unwrap();

    let rows = select.query_rows(&mut executor).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(
        executor.commands,
        [
            "SELECT COUNT(*) FROM Users WHERE (Active = @PN_IDX_0)",
            "SELECT * FROM (SELECT TOP 10 * FROM (SELECT TOP 20 Id,Name FROM Users WHERE (Active = @PN_IDX_0) ORDER BY Id ASC) AS PAGE_INNER ORDER BY Id DESC) AS PAGE_OUTER ORDER BY Id ASC",
        ]
    );
}

#[test]
fn test_query_rows_skips_count_when_not_needed() {
    let mut executor = CountingExecutor {
        count: 100,
        commands: Vec::new(),
    };

    users(Dialect::Access)
        .page(10, 1)
        .unwrap()
        .query_rows(&mut executor)
        .unwrap();
    users(Dialect::Access)
        .page_with_count(10, 2, 100)
        .unwrap()
        .query_rows(&mut executor)
        .unwrap();
    users(Dialect::Postgres)
        .page(10, 2)
        .unwrap()
        .query_rows(&mut executor)
        .unwrap();

    assert_eq!(executor.commands.len(), 3);
    assert!(executor.commands.iter().all(|c| !c.contains("COUNT(*)")));
}
