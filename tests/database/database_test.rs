// tests/database/database_test.rs
use std::io::Write;

use sqlshape::config::{ConnectionSettings, Settings, SettingsError};
use sqlshape::database::Database;
use sqlshape::sql::condition::Condition;
use sqlshape::sql::dialect::{DatePart, Dialect, SqlDialect};
use sqlshape::sql::statement::Statement;
use sqlshape::Error;

const CONFIG: &str = r#"
[connections.default]
dialect = "postgres"
connection_string = "Host=db;Database=shop"

[connections.legacy]
connection_string = "Provider=Microsoft.Jet.OLEDB.4.0;Data Source=C:\\legacy\\shop.mdb"

[connections.warehouse]
connection_string = "${SQLSHAPE_IT_WAREHOUSE}"

[connections.mystery]
connection_string = "just some text"
"#;

#[test]
fn test_explicit_dialect_wins() {
    let settings = Settings::from_toml_str(CONFIG).unwrap();
    let (name, conn) = settings.default_connection().unwrap();
    assert_eq!(name, "default");

    let db = Database::from_connection(conn).unwrap();
    assert_eq!(db.dialect(), Dialect::Postgres);
}

#[test]
fn test_dialect_detected_from_connection_string() {
    let settings = Settings::from_toml_str(CONFIG).unwrap();
    let db = Database::from_connection(settings.get_connection("legacy").unwrap()).unwrap();
    assert_eq!(db.dialect(), Dialect::Access);
}

#[test]
fn test_detection_after_env_expansion() {
    std::env::set_var("SQLSHAPE_IT_WAREHOUSE", "mysql://etl@warehouse/facts");
    let settings = Settings::from_toml_str(CONFIG).unwrap();
    let conn = settings.get_connection("warehouse").unwrap();

    assert_eq!(
        conn.resolved_connection_string().unwrap(),
        "mysql://etl@warehouse/facts"
    );
    assert_eq!(Database::from_connection(conn).unwrap().dialect(), Dialect::MySql);
    std::env::remove_var("SQLSHAPE_IT_WAREHOUSE");
}

#[test]
fn test_unrecognized_connection() {
    let settings = Settings::from_toml_str(CONFIG).unwrap();
    let err = Database::from_connection(settings.get_connection("mystery").unwrap()).unwrap_err();
    assert!(matches!(err, Error::DialectNotRecognized(_)));

    let missing_var = ConnectionSettings {
        dialect: None,
        connection_string: "${SQLSHAPE_IT_UNSET_VARIABLE}".into(),
    };
    assert!(matches!(
        Database::from_connection(&missing_var),
        Err(Error::Settings(SettingsError::MissingEnvVar(_)))
    ));
}

#[test]
fn test_settings_from_file() {
    let path = std::env::temp_dir().join(format!("sqlshape_it_{}.toml", std::process::id()));
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(CONFIG.as_bytes()).unwrap();
    drop(file);

    let settings = Settings::from_file(&path).unwrap();
    assert_eq!(settings.connections.len(), 4);
    std::fs::remove_file(&path).unwrap();

    assert!(matches!(
        Settings::from_toml_str("connections = 5"),
        Err(SettingsError::ParseError(_))
    ));
}

#[test]
fn test_factory_statements_render_for_dialect() {
    let db = Database::new(Dialect::Oracle);

    let select = db
        .select("Users")
        .column("Name")
        .filter(Condition::equal("Id", 1))
        .top(1)
        .unwrap();
    assert_eq!(
        select.to_sql().unwrap(),
        "SELECT * FROM (SELECT Name FROM Users WHERE (Id = :PN_IDX_0)) WHERE ROWNUM <= 1"
    );

    let update = db.update("Users").set("Name", "ann").where_original("Id", 1);
    assert_eq!(
        update.to_sql().unwrap(),
        "UPDATE Users SET Name=:PN_NEW_Name WHERE (Id = :PN_OLD_Id)"
    );

    let inner = db.select("Orders").column("UserId");
    let derived = db.select_from(inner).alias("O");
    assert_eq!(
        derived.to_sql().unwrap(),
        "SELECT * FROM (SELECT UserId FROM Orders) O"
    );
}

#[test]
fn test_functions_follow_dialect() {
    let access = Database::new(Dialect::Access);
    let sqlite = Database::from(Dialect::Sqlite);

    assert_eq!(access.functions().upper("Name"), "UCASE(Name)");
    assert_eq!(
        sqlite.functions().date_part("Created", DatePart::Year),
        "CAST(STRFTIME('%Y',Created) AS INTEGER)"
    );
    assert_eq!(
        access.identity_command().unwrap().text,
        "SELECT @@IDENTITY"
    );
}

#[test]
fn test_default_database_is_sqlserver() {
    let db = Database::default();
    assert_eq!(db.dialect(), Dialect::SqlServer);
    assert_eq!(
        db.insert("T").set("a", 1).to_sql().unwrap(),
        "INSERT INTO T ( a ) VALUES ( @PN_NEW_a )"
    );
}
