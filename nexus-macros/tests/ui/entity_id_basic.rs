use nexus_domain::identity::EntityId;
use nexus_macros::entity_id;
use uuid::Uuid;

#[entity_id]
struct OrderId(String);

#[entity_id(debug = false)]
struct ProfileId(Uuid);

impl std::fmt::Debug for ProfileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ProfileId(..)")
    }
}

fn main() {
    let id = OrderId::new("o-1".to_string());
    assert_eq!(id.to_string(), "o-1");
    assert_eq!(id.value(), "o-1");
    assert_eq!(serde_json::to_string(&id).unwrap(), "\"o-1\"");

    let generic: EntityId = (&id).into();
    assert_eq!(generic.as_str(), "o-1");
    let back = OrderId::try_from(&generic).unwrap();
    assert_eq!(back, id);

    let pid = ProfileId::new(Uuid::new_v4());
    assert_eq!(format!("{:?}", pid), "ProfileId(..)");
    let parsed: ProfileId = pid.to_string().parse().unwrap();
    assert_eq!(parsed, pid);
    assert!(ProfileId::try_from(&EntityId::new("not-a-uuid")).is_err());
}
