use std::sync::Arc;

use hqdm_rdf::{
    changes::ChangeSet,
    config::Config,
    graph::GraphFacade,
    model::{
        roles, Capability, CapabilityRegistry, Entity, ExtensionProvider, Iri, RegistryBuilder,
        Value,
    },
    service::ModelService,
    Error, Result,
};
use rstest::rstest;

fn iri(text: &str) -> Iri {
    Iri::new(text).expect("valid iri")
}

fn service() -> ModelService {
    ModelService::from_config(&Config::default(), &[]).expect("service")
}

fn hqdm(service: &ModelService, name: &str) -> Iri {
    service.registry().vocabulary().term(name).expect("term")
}

#[test]
fn type_predicate_not_membership_drives_capabilities() {
    let service = service();
    let vocabulary = service.registry().vocabulary();
    let person = hqdm(&service, "person");
    let class_of_person = iri("http://example.org/ClassOfPerson");

    let mut alice = service
        .factory()
        .create(iri("http://example.org/alice"), [person.clone()])
        .expect("alice");
    alice.add_value(
        vocabulary.member_of().clone(),
        Value::Reference(class_of_person.clone()),
    );
    assert!(alice.has_capability(Capability::Person));
    assert_eq!(alice.capabilities().len(), alice.registry().closure(Capability::Person).len());

    assert!(alice.remove_value(
        vocabulary.member_of(),
        &Value::Reference(class_of_person)
    ));
    assert!(alice.has_capability(Capability::Person));
    assert!(!alice.has_value(vocabulary.member_of()));

    assert!(alice.remove_type(&person));
    assert!(!alice.has_capability(Capability::Person));
    assert!(alice.capabilities().is_empty());
}

#[rstest]
#[case::add_only(&[("+", "person"), ("+", "participant")])]
#[case::reversed(&[("+", "participant"), ("+", "person")])]
#[case::detour(&[("+", "organization"), ("+", "participant"), ("-", "organization"), ("+", "person")])]
#[case::re_added(&[("+", "person"), ("-", "person"), ("+", "participant"), ("+", "person")])]
fn capabilities_depend_only_on_the_final_types(#[case] operations: &[(&str, &str)]) {
    let service = service();
    let expected = service
        .factory()
        .create(
            iri("http://example.org/alice"),
            [hqdm(&service, "person"), hqdm(&service, "participant")],
        )
        .expect("expected");

    let mut alice = Entity::new(iri("http://example.org/alice"), Arc::clone(service.registry()));
    for (operation, name) in operations {
        let type_iri = hqdm(&service, name);
        match *operation {
            "+" => alice.add_type(type_iri),
            _ => alice.remove_type(&type_iri),
        };
    }

    assert_eq!(alice.capabilities(), expected.capabilities());
}

#[test]
fn unknown_types_survive_a_graph_round_trip() {
    let service = service();
    let gadget = iri("http://example.org/vocab#Gadget");
    let thing = service
        .factory()
        .create(
            iri("http://example.org/thing"),
            [hqdm(&service, "physical_object"), gadget.clone()],
        )
        .expect("thing");
    assert!(thing.unrecognized_types().contains(&gadget));

    let mut change = ChangeSet::creating([thing]).expect("change set");
    service.apply(&mut change).expect("apply");

    let stored = service
        .get(&iri("http://example.org/thing"))
        .expect("get")
        .expect("stored");
    assert!(stored.types().any(|type_iri| *type_iri == gadget));
    assert!(stored.unrecognized_types().contains(&gadget));
    assert!(stored.has_capability(Capability::PhysicalObject));
}

#[test]
fn upgrade_failure_leaves_the_entity_untouched() {
    let service = service();
    let class = service
        .factory()
        .create_named(iri("http://example.org/ClassOfPerson"), "ClassOfPerson")
        .expect("class");
    let before = class.predicates().clone();

    let err = service
        .factory()
        .upgrade(&class, Capability::Person)
        .expect_err("abstract objects are not extents");
    assert!(matches!(
        err,
        Error::CapabilityConflict {
            requested: Capability::Person,
            existing: Capability::AbstractObject,
            ..
        }
    ));
    assert_eq!(class.predicates(), &before);
    assert!(class.has_capability(Capability::ClassOfPerson));
}

#[test]
fn kind_membership_implies_the_component_type() {
    let service = service();
    let kind = hqdm(&service, "kind_of_person");
    let bob = service
        .factory()
        .builder(iri("http://example.org/bob"))
        .with_type(hqdm(&service, "participant"))
        .member_of_kind(&kind)
        .build()
        .expect("bob");

    assert!(bob.has_capability(Capability::Person));
    assert!(!bob.has_capability(Capability::KindOfPerson));
    assert!(roles::kinds(&bob).contains(&kind));
}

const EMPLOYEE: Capability = Capability::Custom("Employee");

struct Staff;

impl ExtensionProvider for Staff {
    fn name(&self) -> &str {
        "staff"
    }

    fn register(&self, registry: &mut RegistryBuilder) -> Result<()> {
        registry.register_with_parents(
            iri("http://example.org/staff#Employee"),
            EMPLOYEE,
            &[Capability::Person],
        );
        Ok(())
    }
}

#[test]
fn providers_extend_the_registry_of_a_service() {
    let providers: Vec<Arc<dyn ExtensionProvider>> = vec![Arc::new(Staff)];
    let service = ModelService::from_config(&Config::default(), &providers).expect("service");
    assert!(service.registry().len() > CapabilityRegistry::hqdm().expect("registry").len());

    let carol = service
        .factory()
        .create(
            iri("http://example.org/carol"),
            [iri("http://example.org/staff#Employee")],
        )
        .expect("carol");
    assert!(carol.has_capability(EMPLOYEE));
    assert!(carol.has_capability(Capability::Person));
    assert!(roles::require_capability(&carol, Capability::SpatioTemporalExtent).is_ok());

    let mut change = ChangeSet::creating([carol]).expect("change set");
    service.apply(&mut change).expect("apply");
    let tx = service.graph().begin_read().expect("read");
    let stored = service
        .graph()
        .get(tx, &iri("http://example.org/carol"))
        .expect("get")
        .expect("stored");
    service.graph().commit(tx).expect("end read");
    assert!(stored.has_capability(EMPLOYEE));
}
