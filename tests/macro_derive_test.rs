//! Derive macro behaviour for `Constructible` and `Attributes`

use omapper::{Arguments, Attributes, AttributesDerive, Constructible, ConstructibleDerive, Value};
use std::sync::Arc;

#[derive(Debug, Default, PartialEq, ConstructibleDerive, AttributesDerive, Clone)]
struct Account {
    name: String,
    balance: i64,
    #[omapper(skip)]
    cache: Vec<u8>,
}

#[derive(Debug, ConstructibleDerive, AttributesDerive, Clone)]
struct Marker;

#[derive(Debug, ConstructibleDerive, AttributesDerive, Clone)]
struct Keyword {
    r#type: String,
}

#[derive(Debug, AttributesDerive, Clone)]
struct SharedHolder {
    items: Arc<Vec<u32>>,
}

fn account_args(name: &str, balance: i64) -> Arguments {
    let mut args = Arguments::new();
    args.insert("name", Value::new(name.to_string()));
    args.insert("balance", Value::new(balance));
    args
}

#[test]
fn test_parameters_follow_declaration_order() {
    assert_eq!(Account::parameters(), &["name", "balance"]);
    assert_eq!(<Account as Constructible>::type_name(), "Account");
    assert_eq!(<Account as Attributes>::type_name(), "Account");
}

#[test]
fn test_construct_from_named_arguments() -> anyhow::Result<()> {
    let mut args = account_args("main", 12);
    let account = Account::construct(&mut args).map_err(|e| anyhow::anyhow!(e))?;
    assert!(args.is_empty());
    assert_eq!(
        account,
        Account {
            name: "main".to_string(),
            balance: 12,
            cache: Vec::new(),
        }
    );
    Ok(())
}

#[test]
fn test_construct_reports_missing_argument() {
    let mut args = Arguments::new();
    args.insert("name", Value::new("main".to_string()));

    let err = Account::construct(&mut args).unwrap_err();
    assert_eq!(err.to_string(), "missing argument 'balance'");
    assert_eq!(args.names().collect::<Vec<_>>(), vec!["name"]);
}

#[test]
fn test_construct_reports_wrong_type() {
    let mut args = account_args("main", 0);
    args.insert("balance", Value::new(12_u8));

    let err = Account::construct(&mut args).unwrap_err();
    assert!(err.to_string().starts_with("argument 'balance' has the wrong type"), "{err}");
    // nothing was taken, so the whole set is still there to report
    assert_eq!(args.names().collect::<Vec<_>>(), vec!["name", "balance"]);
}

#[test]
fn test_attributes_read_by_name() {
    let account = Account {
        name: "main".to_string(),
        balance: 12,
        cache: vec![1],
    };

    assert_eq!(Account::attribute_names(), &["name", "balance"]);
    let balance = account.attribute("balance").unwrap();
    assert_eq!(balance.downcast::<i64>().unwrap(), 12);
    assert!(account.attribute("cache").is_none());
    assert!(account.attribute("missing").is_none());
}

#[test]
fn test_unit_struct_has_no_parameters() {
    assert!(Marker::parameters().is_empty());
    assert!(Marker::attribute_names().is_empty());
    assert!(Marker::construct(&mut Arguments::new()).is_ok());
    assert!(Marker.attribute("anything").is_none());
}

#[test]
fn test_raw_identifiers_use_plain_names() {
    assert_eq!(Keyword::parameters(), &["type"]);

    let mut args = Arguments::new();
    args.insert("type", Value::new("admin".to_string()));
    let keyword = Keyword::construct(&mut args).unwrap();
    assert_eq!(keyword.r#type, "admin");
    assert!(keyword.attribute("type").is_some());
}

#[test]
fn test_shared_fields_are_aliased() {
    let holder = SharedHolder {
        items: Arc::new(vec![1, 2, 3]),
    };

    let items = holder
        .attribute("items")
        .unwrap()
        .downcast::<Arc<Vec<u32>>>()
        .unwrap();

    assert!(Arc::ptr_eq(&items, &holder.items));
}

#[test]
fn test_hand_written_attributes_default_type_name() {
    struct Plain;

    impl Attributes for Plain {
        fn attribute(&self, _: &str) -> Option<Value> {
            None
        }

        fn attribute_names() -> &'static [&'static str] {
            &[]
        }
    }

    assert!(Plain::type_name().ends_with("Plain"));
    assert_eq!(<Marker as Attributes>::type_name(), "Marker");
}
