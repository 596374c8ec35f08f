use nexus_domain::domain_event::{DomainEvent, EventPayload};
use nexus_domain::identity::{EntityId, IdentityService};
use nexus_macros::domain_event;

#[domain_event]
enum MixedEvent {
    Started,
    Updated(String),
    #[event(event_type = "mixed.completed")]
    Completed { result: i32 },
}

#[domain_event(event_type = "user.activated")]
struct UserActivated {
    email: String,
}

#[domain_event]
struct Archived {}

fn main() {
    assert_eq!(MixedEvent::Started.event_type(), "MixedEvent.Started");
    assert_eq!(MixedEvent::Updated("x".into()).event_type(), "MixedEvent.Updated");
    assert_eq!(MixedEvent::Completed { result: 1 }.event_type(), "mixed.completed");
    assert_eq!(Archived {}.event_type(), "Archived");

    let ids = IdentityService::default();
    let payload = UserActivated { email: "ana@example.com".into() };
    let event = DomainEvent::from_payload(&ids, EntityId::new("u-1"), &payload).unwrap();
    assert_eq!(event.event_type(), "user.activated");
    assert_eq!(event.payload_as::<UserActivated>().unwrap(), payload);
}
