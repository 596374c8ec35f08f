use nexus_domain::entity::{BaseEntity, Entity};
use nexus_domain::identity::IdentityService;
use nexus_macros::entity;

#[entity]
struct LineItem {
    sku: String,
    quantity: u32,
}

fn main() {
    let ids = IdentityService::default();
    let mut item = LineItem {
        base: BaseEntity::new(),
        sku: "SKU-1".into(),
        quantity: 2,
    };
    assert!(item.id().is_none());
    let id = item.ensure_id(&ids);
    assert_eq!(item.id(), Some(&id));

    let json = serde_json::to_value(&item).unwrap();
    assert_eq!(json["id"], id.as_str());
    assert_eq!(json["sku"], "SKU-1");
    assert!(json.get("base").is_none());

    let back: LineItem = serde_json::from_value(json).unwrap();
    assert!(back.same_identity_as(&item));
    assert_eq!(back.quantity, 2);
}
