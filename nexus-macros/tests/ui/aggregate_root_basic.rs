use nexus_domain::aggregate_root::{AggregateBase, AggregateRoot};
use nexus_domain::entity::Entity;
use nexus_domain::error::DomainResult;
use nexus_domain::identity::IdentityService;
use nexus_macros::{aggregate_root, domain_event};

#[domain_event]
enum CartEvent {
    #[event(event_type = "cart.item_added")]
    ItemAdded { sku: String },
    Cleared,
}

#[aggregate_root(type = "cart")]
struct Cart {
    items: Vec<String>,
}

#[aggregate_root]
struct Wishlist {
    #[serde(default)]
    names: Vec<String>,
}

impl Cart {
    fn new() -> Self {
        Self {
            base: AggregateBase::new(),
            items: Vec::new(),
        }
    }

    fn add(&mut self, ids: &IdentityService, sku: &str) -> DomainResult<()> {
        self.items.push(sku.to_string());
        self.raise(ids, &CartEvent::ItemAdded { sku: sku.to_string() })
    }

    fn clear(&mut self, ids: &IdentityService) -> DomainResult<()> {
        self.items.clear();
        self.raise(ids, &CartEvent::Cleared)
    }
}

fn main() {
    assert_eq!(Cart::TYPE, "cart");
    assert_eq!(Wishlist::TYPE, "Wishlist");

    let ids = IdentityService::default();
    let mut cart = Cart::new();
    cart.add(&ids, "A").unwrap();
    cart.clear(&ids).unwrap();

    assert!(cart.id().is_some());
    assert_eq!(cart.version().value(), 2);

    let events = cart.drain_events();
    let types: Vec<&str> = events.iter().map(|e| e.event_type()).collect();
    assert_eq!(types, vec!["cart.item_added", "CartEvent.Cleared"]);
    assert!(cart.drain_events().is_empty());

    let json = serde_json::to_value(&cart).unwrap();
    assert_eq!(json["version"], 2);
    let restored: Cart = serde_json::from_value(json).unwrap();
    assert_eq!(restored.id(), cart.id());
    assert!(!restored.has_pending_events());

    let w: Wishlist = serde_json::from_value(serde_json::json!({
        "id": "w-1",
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-01-01T00:00:00Z"
    }))
    .unwrap();
    assert_eq!(w.id().map(|id| id.as_str()), Some("w-1"));
    assert!(w.names.is_empty());
    assert!(w.version().is_new());
}
