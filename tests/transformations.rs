use std::sync::Arc;

use hqdm_rdf::{
    changes::{ChangeSet, ChangeSetState, Transformation},
    config::Config,
    graph::{GraphFacade, MemoryGraph, Transaction},
    model::{Entity, EntityFactory, Iri},
    service::ModelService,
    Error, Result,
};

fn iri(text: &str) -> Iri {
    Iri::new(text).expect("valid iri")
}

fn service() -> ModelService {
    ModelService::from_config(&Config::default(), &[]).expect("service")
}

fn term(factory: &EntityFactory, name: &str) -> Iri {
    factory.registry().vocabulary().term(name).expect("term")
}

/// Reference data, the individuals classified by it, and an association
/// between them.
fn marriage_steps(factory: &EntityFactory) -> [ChangeSet; 3] {
    let vocabulary = factory.registry().vocabulary();
    let class_of_person = factory
        .create_named(iri("http://example.org/ClassOfPerson"), "ClassOfPerson")
        .expect("class");

    let individuals = ["alice", "bob"].map(|name| {
        factory
            .builder(iri(&format!("http://example.org/{name}")))
            .with_type(term(factory, "person"))
            .with_type(term(factory, "participant"))
            .member_of(class_of_person.id())
            .with_string(vocabulary.entity_name().clone(), name)
            .build()
            .expect("individual")
    });

    let marriage = factory
        .builder(iri("http://example.org/marriage"))
        .with_type(term(factory, "association"))
        .with_reference(
            term(factory, "consists_of_participant"),
            &iri("http://example.org/alice"),
        )
        .with_reference(
            term(factory, "consists_of_participant"),
            &iri("http://example.org/bob"),
        )
        .build()
        .expect("marriage");

    [
        ChangeSet::creating([class_of_person]).expect("reference data"),
        ChangeSet::creating(individuals).expect("individuals"),
        ChangeSet::creating([marriage]).expect("association"),
    ]
}

#[test]
fn three_step_transformation_and_its_inverse() {
    let service = service();
    let mut transformation = Transformation::new(marriage_steps(service.factory()));

    service
        .apply_transformation(&mut transformation)
        .expect("apply");
    assert_eq!(service.graph().len().expect("state"), 4);
    assert_eq!(transformation.applied_steps(), 3);

    let mut inverse = transformation.invert().expect("invert");
    assert_eq!(inverse.len(), 3);
    assert_eq!(
        inverse.steps()[0]
            .deletes()
            .map(|entity| entity.id().clone())
            .collect::<Vec<_>>(),
        vec![iri("http://example.org/marriage")]
    );

    service
        .apply_transformation(&mut inverse)
        .expect("apply inverse");
    assert!(service.graph().is_empty().expect("state"));
}

#[test]
fn steps_must_run_in_dependency_order() {
    let factory = service().factory().clone();
    let [reference_data, individuals, _] = marriage_steps(&factory);

    let graph = MemoryGraph::new(Arc::clone(factory.registry()));
    let mut wrong_order = Transformation::new([individuals.clone(), reference_data.clone()]);
    let err = wrong_order.apply(&graph).expect_err("individuals first");
    assert_eq!(err.failed_step(), Some(0));
    assert!(graph.is_empty().expect("state"));

    let graph = MemoryGraph::new(Arc::clone(factory.registry()));
    let mut right_order = Transformation::new([reference_data, individuals]);
    right_order.apply(&graph).expect("reference data first");
    assert_eq!(graph.len().expect("state"), 3);
}

#[test]
fn invert_twice_gives_back_the_same_changes() {
    let service = service();
    let [mut reference_data, mut individuals, _] = marriage_steps(service.factory());
    service.apply(&mut reference_data).expect("reference data");

    service.apply(&mut individuals).expect("apply");
    let inverse = service.undo(&individuals).expect("undo");
    let mut twice = inverse.invert().expect("invert twice");

    let original = individuals.to_record();
    let record = twice.to_record();
    assert_eq!(record.creates, original.creates);
    assert_eq!(record.deletes, original.deletes);

    service.apply(&mut twice).expect("redo");
    assert_eq!(twice.state(), ChangeSetState::Applied);
    assert_eq!(service.graph().len().expect("state"), 3);
}

#[test]
fn apply_then_invert_restores_an_empty_graph() {
    let service = service();
    let [mut reference_data, ..] = marriage_steps(service.factory());

    service.apply(&mut reference_data).expect("apply");
    assert!(!service.graph().is_empty().expect("state"));

    service.undo(&reference_data).expect("undo");
    assert!(service.graph().is_empty().expect("state"));
}

#[test]
fn creating_twice_equals_creating_once() {
    let service = service();
    let [mut reference_data, individuals, _] = marriage_steps(service.factory());
    service.apply(&mut reference_data).expect("reference data");

    let mut once = individuals.clone();
    service.apply(&mut once).expect("once");
    let after_once = service.graph().snapshot().expect("snapshot");

    let mut twice = individuals;
    service.apply(&mut twice).expect("twice");
    assert_eq!(service.graph().snapshot().expect("snapshot"), after_once);
}

#[test]
fn undo_removes_only_the_recorded_values() {
    let service = service();
    let factory = service.factory();
    let name = factory.registry().vocabulary().entity_name().clone();
    let alice = |text: &str| {
        factory
            .builder(iri("http://example.org/alice"))
            .with_type(term(factory, "person"))
            .with_string(name.clone(), text)
            .build()
            .expect("alice")
    };

    let mut first = ChangeSet::creating([alice("Alice")]).expect("first");
    let mut second = ChangeSet::creating([alice("Al")]).expect("second");
    service.apply(&mut first).expect("first");
    let before = service.graph().snapshot().expect("snapshot");
    service.apply(&mut second).expect("second");

    service.undo(&second).expect("undo second");
    assert_eq!(service.graph().snapshot().expect("snapshot"), before);
    let stored = service
        .get(&iri("http://example.org/alice"))
        .expect("get")
        .expect("alice still stored");
    assert_eq!(stored.value(&name), alice("Alice").value(&name));
    assert!(stored.types().next().is_some());
}

#[test]
fn undoing_overlapping_creates_keeps_what_was_already_stored() {
    let service = service();
    let [mut reference_data, individuals, _] = marriage_steps(service.factory());
    service.apply(&mut reference_data).expect("reference data");

    let class_of_person = service
        .factory()
        .create_named(iri("http://example.org/ClassOfPerson"), "ClassOfPerson")
        .expect("class");
    let mut overlapping = ChangeSet::creating(
        individuals
            .creates()
            .cloned()
            .chain([class_of_person]),
    )
    .expect("overlapping");
    let before = service.graph().snapshot().expect("snapshot");

    service.apply(&mut overlapping).expect("apply");
    assert_eq!(overlapping.creates().count(), 2);
    assert_eq!(service.graph().len().expect("state"), 3);

    service.undo(&overlapping).expect("undo");
    assert_eq!(service.graph().snapshot().expect("snapshot"), before);
}

/// Graph that refuses to create one identifier.
struct RefusingGraph {
    inner: MemoryGraph,
    refused: Iri,
}

impl GraphFacade for RefusingGraph {
    fn begin_read(&self) -> Result<Transaction> {
        self.inner.begin_read()
    }

    fn begin_write(&self) -> Result<Transaction> {
        self.inner.begin_write()
    }

    fn commit(&self, transaction: Transaction) -> Result<()> {
        self.inner.commit(transaction)
    }

    fn abort(&self, transaction: Transaction) -> Result<()> {
        self.inner.abort(transaction)
    }

    fn get(&self, transaction: Transaction, id: &Iri) -> Result<Option<Entity>> {
        self.inner.get(transaction, id)
    }

    fn create(&self, transaction: Transaction, entity: &Entity) -> Result<()> {
        if *entity.id() == self.refused {
            return Err(Error::Message(format!("disk full while writing {}", entity.id())));
        }
        self.inner.create(transaction, entity)
    }

    fn update(&self, transaction: Transaction, entity: &Entity) -> Result<()> {
        self.inner.update(transaction, entity)
    }

    fn delete(&self, transaction: Transaction, entity: &Entity) -> Result<()> {
        self.inner.delete(transaction, entity)
    }
}

#[test]
fn failed_write_leaves_nothing_behind() {
    let factory = service().factory().clone();
    let service = ModelService::new(
        factory.clone(),
        RefusingGraph {
            inner: MemoryGraph::new(Arc::clone(factory.registry())),
            refused: iri("http://example.org/bob"),
        },
    );
    let [mut reference_data, mut individuals, mut association] = marriage_steps(&factory);
    service.apply(&mut reference_data).expect("reference data");

    let err = service.apply(&mut individuals).expect_err("bob is refused");
    assert!(matches!(err, Error::TransactionFailure { ref reason } if reason.contains("disk full")));
    assert_eq!(individuals.state(), ChangeSetState::Failed);
    assert!(service
        .get(&iri("http://example.org/alice"))
        .expect("get")
        .is_none());
    assert_eq!(service.graph().inner.len().expect("state"), 1);

    let mut transformation = Transformation::new([association.clone()]);
    let err = service
        .apply_transformation(&mut transformation)
        .expect_err("participants are missing");
    assert_eq!(err.failed_step(), Some(0));
    assert_eq!(association.state(), ChangeSetState::Built);
    assert!(service.apply(&mut association).is_err());
}

#[test]
fn readers_interleaved_with_a_writer_see_only_committed_state() {
    let service = service();
    let graph = service.graph();
    let [mut reference_data, ..] = marriage_steps(service.factory());
    let class = iri("http://example.org/ClassOfPerson");

    let writer = graph.begin_write().expect("begin");
    for entity in reference_data.creates() {
        graph.create(writer, entity).expect("create");
    }
    let reader = graph.begin_read().expect("begin read");
    assert!(graph.get(writer, &class).expect("own write").is_some());
    assert!(graph.get(reader, &class).expect("get").is_none());
    assert!(service.apply(&mut reference_data).is_err());

    graph.commit(reader).expect("end read");
    assert!(graph.is_empty().expect("state"));
    graph.commit(writer).expect("commit");

    let reader = graph.begin_read().expect("begin read");
    assert!(graph.get(reader, &class).expect("get").is_some());
    graph.abort(reader).expect("end read");
    assert_eq!(graph.len().expect("state"), 1);
}
