// tests/predicate/translator_test.rs
use sqlshape::mapping::{EntityMapper, EntityMapping};
use sqlshape::predicate::{Method, Predicate, PredicateTranslator};
use sqlshape::sql::condition::{Condition, LikeMatch, Operator};
use sqlshape::sql::dialect::Dialect;
use sqlshape::sql::dml::{Delete, Update};
use sqlshape::sql::select::Select;
use sqlshape::sql::statement::Statement;
use sqlshape::Error;

fn mapper() -> EntityMapper {
    let mut mapper = EntityMapper::new();
    mapper
        .register(
            EntityMapping::new("User", "Users")
                .column("id", "Id")
                .column("name", "UserName")
                .column("age", "Age")
                .column("email", "Email")
                .column("active", "IsActive")
                .column("managerId", "ManagerId"),
        )
        .register(
            EntityMapping::new("Order", "Orders")
                .column("userId", "UserId")
                .column("total", "Total"),
        );
    mapper
}

fn user(property: &str) -> Predicate {
    Predicate::member("User", property)
}

fn translate(predicate: &Predicate) -> Condition {
    let mapper = mapper();
    PredicateTranslator::new(&mapper).translate(predicate).unwrap()
}

#[test]
fn test_comparisons() {
    let cases = [
        (
            user("age").equal(Predicate::constant(30)),
            Condition::equal("Age", 30),
        ),
        (
            user("age").not_equal(Predicate::constant(30)),
            Condition::not_equal("Age", 30),
        ),
        (
            user("age").greater_than(Predicate::constant(30)),
            Condition::greater_than("Age", 30),
        ),
        (
            user("age").less_than(Predicate::constant(30)),
            Condition::less_than("Age", 30),
        ),
        (
            user("age").greater_than_or_equal(Predicate::constant(30)),
            Condition::greater_than_or_equal("Age", 30),
        ),
        (
            user("age").less_than_or_equal(Predicate::constant(30)),
            Condition::less_than_or_equal("Age", 30),
        ),
    ];
    for (predicate, expected) in cases {
        assert_eq!(translate(&predicate), expected);
    }
}

#[test]
fn test_constant_on_the_left() {
    assert_eq!(
        translate(&Predicate::constant(30).less_than_or_equal(user("age"))),
        Condition::greater_than_or_equal("Age", 30)
    );
    assert_eq!(
        translate(&Predicate::constant("ann").equal(user("name"))),
        Condition::equal("UserName", "ann")
    );
}

#[test]
fn test_null_comparisons() {
    assert_eq!(
        translate(&user("email").equal(Predicate::null())),
        Condition::is_null("Email")
    );
    assert_eq!(
        translate(&user("email").not_equal(Predicate::null())),
        Condition::is_not_null("Email")
    );
    assert_eq!(
        translate(&user("email").call(Method::IsNull, vec![])),
        Condition::is_null("Email")
    );
    assert_eq!(
        translate(&user("email").call(Method::IsNotNull, vec![])),
        Condition::is_not_null("Email")
    );
}

#[test]
fn test_member_to_member() {
    assert_eq!(
        translate(&user("managerId").not_equal(user("id"))),
        Condition::compare_columns("ManagerId", Operator::NotEqual, "Id").unwrap()
    );
}

#[test]
fn test_logical_operators() {
    let p = user("age")
        .greater_than(Predicate::constant(18))
        .and(user("name").equal(Predicate::constant("ann")))
        .or(user("active").negate());

    let expected = Condition::greater_than("Age", 18)
        .and(Condition::equal("UserName", "ann"))
        .or(Condition::equal("IsActive", true).negate());
    assert_eq!(translate(&p), expected);

    let (sql, params) = translate(&p).to_sql(Dialect::SqlServer).unwrap();
    assert_eq!(
        sql,
        "(((Age > @PN_IDX_0) AND (UserName = @PN_IDX_1)) OR (NOT((IsActive = @PN_IDX_2))))"
    );
    assert_eq!(params.len(), 3);
}

#[test]
fn test_in_and_not_in() {
    assert_eq!(
        translate(&user("id").call(Method::In, vec![Predicate::values([1, 2, 3])])),
        Condition::in_values("Id", [1, 2, 3])
    );
    assert_eq!(
        translate(&user("id").call(
            Method::NotIn,
            vec![Predicate::constant(4), Predicate::constant(5)]
        )),
        Condition::not_in_values("Id", [4, 5])
    );

    let buyers = Select::new(Dialect::SqlServer, "Orders").column("UserId");
    assert_eq!(
        translate(&user("id").call(Method::In, vec![Predicate::query(buyers.clone())])),
        Condition::in_select("Id", buyers)
    );
}

#[test]
fn test_between() {
    assert_eq!(
        translate(&user("age").call(
            Method::Between,
            vec![Predicate::constant(18), Predicate::constant(65)]
        )),
        Condition::between("Age", 18, 65)
    );
    assert_eq!(
        translate(&user("age").call(
            Method::NotBetween,
            vec![Predicate::constant(18), Predicate::constant(65)]
        )),
        Condition::not_between("Age", 18, 65)
    );
}

#[test]
fn test_like_family() {
    let cases = [
        (Method::Like, LikeMatch::Exact, false),
        (Method::NotLike, LikeMatch::Exact, true),
        (Method::LikeAll, LikeMatch::Contains, false),
        (Method::NotLikeAll, LikeMatch::Contains, true),
        (Method::LikeStartWith, LikeMatch::StartsWith, false),
        (Method::NotLikeStartWith, LikeMatch::StartsWith, true),
        (Method::LikeEndWith, LikeMatch::EndsWith, false),
        (Method::NotLikeEndWith, LikeMatch::EndsWith, true),
    ];
    for (method, mode, negated) in cases {
        let p = user("name").call(method, vec![Predicate::constant("an")]);
        assert_eq!(
            translate(&p),
            Condition::like_match("UserName", "an", mode, negated),
            "{}",
            method
        );
    }
}

#[test]
fn test_bare_boolean_member() {
    assert_eq!(translate(&user("active")), Condition::equal("IsActive", true));
}

#[test]
fn test_method_names_parse() {
    let method: Method = "LikeStartWith".parse().unwrap();
    let p = user("name").call(method, vec![Predicate::constant("A")]);
    let (sql, params) = translate(&p).to_sql(Dialect::Oracle).unwrap();
    assert_eq!(sql, "(UserName LIKE :PN_IDX_0)");
    assert_eq!(params[0].value().as_str(), Some("A%"));
}

#[test]
fn test_errors() {
    let mapper = mapper();
    let translator = PredicateTranslator::new(&mapper);

    let unknown = Predicate::member("Invoice", "total").equal(Predicate::constant(1));
    assert!(matches!(
        translator.translate(&unknown),
        Err(Error::UnknownEntity(entity)) if entity == "Invoice"
    ));

    let unmapped = user("phone").equal(Predicate::constant("555"));
    assert!(matches!(
        translator.translate(&unmapped),
        Err(Error::UnmappedProperty { .. })
    ));

    let constants = Predicate::constant(1).equal(Predicate::constant(1));
    assert!(matches!(
        translator.translate(&constants),
        Err(Error::UnsupportedPredicate(_))
    ));

    let arity = user("age").call(Method::Between, vec![Predicate::constant(1)]);
    assert!(matches!(
        translator.translate(&arity),
        Err(Error::UnsupportedPredicate(_))
    ));

    let ordered_null = user("age").less_than(Predicate::null());
    assert!(translator.translate(&ordered_null).is_err());
}

#[test]
fn test_where_predicate_on_statements() {
    let mapper = mapper();
    let translator = PredicateTranslator::new(&mapper);
    let p = Predicate::member("Order", "total").greater_than(Predicate::constant(100));

    let select = Select::new(Dialect::MySql, "Orders")
        .where_predicate(&translator, &p)
        .unwrap();
    assert_eq!(
        select.to_sql().unwrap(),
        "SELECT * FROM Orders WHERE (Total > @PN_IDX_0)"
    );

    let update = Update::new(Dialect::MySql, "Orders")
        .set("Flagged", true)
        .where_predicate(&translator, &p)
        .unwrap();
    assert_eq!(
        update.to_sql().unwrap(),
        "UPDATE Orders SET Flagged=@PN_NEW_Flagged WHERE (Total > @PN_IDX_0)"
    );

    let delete = Delete::new(Dialect::MySql, "Orders")
        .where_predicate(&translator, &p)
        .unwrap();
    assert_eq!(
        delete.to_sql().unwrap(),
        "DELETE FROM Orders WHERE (Total > @PN_IDX_0)"
    );
}
