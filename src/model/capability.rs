//! Flat enumeration of the roles an entity can expose.
//!
//! The HQDM lattice is declared once below as `variant => local name:
//! [direct supertypes]`. Closures over that lattice are computed by the
//! [`crate::model::CapabilityRegistry`] at start-up.

use std::fmt::{self, Display, Formatter};

use serde::{Serialize, Serializer};

macro_rules! capabilities {
    ($($variant:ident => $local:literal : [$($parent:ident),*]),+ $(,)?) => {
        /// A named ontology role. Built-in variants mirror HQDM entity types;
        /// [`Capability::Custom`] carries roles contributed by extension providers.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum Capability {
            $($variant,)+
            Custom(&'static str),
        }

        impl Capability {
            /// Every built-in capability, supertypes before subtypes.
            pub const BUILT_IN: &'static [Capability] = &[$(Capability::$variant),+];

            /// HQDM local name of a built-in capability.
            #[must_use]
            pub fn hqdm_name(self) -> Option<&'static str> {
                match self {
                    $(Self::$variant => Some($local),)+
                    Self::Custom(_) => None,
                }
            }

            /// Direct supertypes of a built-in capability.
            #[must_use]
            pub fn parents(self) -> &'static [Capability] {
                match self {
                    $(Self::$variant => &[$(Capability::$parent),*],)+
                    Self::Custom(_) => &[],
                }
            }

            #[must_use]
            pub fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant),)+
                    Self::Custom(name) => name,
                }
            }

            /// Looks a built-in capability up by its HQDM local name.
            #[must_use]
            pub fn from_hqdm_name(name: &str) -> Option<Self> {
                match name {
                    $($local => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

capabilities! {
    Thing => "thing": [],
    AbstractObject => "abstract_object": [Thing],
    SpatioTemporalExtent => "spatio_temporal_extent": [Thing],

    Class => "class": [AbstractObject],
    ClassOfAbstractObject => "class_of_abstract_object": [Class],
    ClassOfClass => "class_of_class": [ClassOfAbstractObject],
    Relationship => "relationship": [AbstractObject],
    ClassOfRelationship => "class_of_relationship": [ClassOfAbstractObject],
    Aggregation => "aggregation": [Relationship],
    Composition => "composition": [Aggregation],
    Classification => "classification": [Relationship],
    Specialization => "specialization": [Relationship],

    Event => "event": [SpatioTemporalExtent],
    PointInTime => "point_in_time": [Event],
    State => "state": [SpatioTemporalExtent],
    Individual => "individual": [State],
    PeriodOfTime => "period_of_time": [State],
    PossibleWorld => "possible_world": [Individual, PeriodOfTime],
    StateOfPhysicalObject => "state_of_physical_object": [State],
    PhysicalObject => "physical_object": [Individual, StateOfPhysicalObject],
    StateOfOrdinaryPhysicalObject => "state_of_ordinary_physical_object": [StateOfPhysicalObject],
    OrdinaryPhysicalObject => "ordinary_physical_object": [PhysicalObject, StateOfOrdinaryPhysicalObject],
    StateOfBiologicalObject => "state_of_biological_object": [StateOfPhysicalObject],
    BiologicalObject => "biological_object": [PhysicalObject, StateOfBiologicalObject],
    StateOfOrdinaryBiologicalObject => "state_of_ordinary_biological_object": [StateOfBiologicalObject, StateOfOrdinaryPhysicalObject],
    OrdinaryBiologicalObject => "ordinary_biological_object": [BiologicalObject, OrdinaryPhysicalObject, StateOfOrdinaryBiologicalObject],
    StateOfSystem => "state_of_system": [StateOfOrdinaryPhysicalObject],
    System => "system": [OrdinaryPhysicalObject, StateOfSystem],
    StateOfSystemComponent => "state_of_system_component": [StateOfPhysicalObject],
    SystemComponent => "system_component": [PhysicalObject, StateOfSystemComponent],
    StateOfBiologicalSystem => "state_of_biological_system": [StateOfOrdinaryBiologicalObject, StateOfSystem],
    BiologicalSystem => "biological_system": [OrdinaryBiologicalObject, System, StateOfBiologicalSystem],
    StateOfParty => "state_of_party": [StateOfSystem],
    Party => "party": [System, StateOfParty],
    StateOfPerson => "state_of_person": [StateOfBiologicalSystem, StateOfParty],
    Person => "person": [BiologicalSystem, Party, StateOfPerson],
    StateOfOrganization => "state_of_organization": [StateOfParty],
    Organization => "organization": [Party, StateOfOrganization],
    Participant => "participant": [StateOfPhysicalObject],
    StateOfActivity => "state_of_activity": [State],
    Activity => "activity": [Individual, StateOfActivity],
    StateOfAssociation => "state_of_association": [State],
    Association => "association": [Individual, StateOfAssociation],

    ClassOfSpatioTemporalExtent => "class_of_spatio_temporal_extent": [Class],
    ClassOfEvent => "class_of_event": [ClassOfSpatioTemporalExtent],
    ClassOfPointInTime => "class_of_point_in_time": [ClassOfEvent],
    ClassOfState => "class_of_state": [ClassOfSpatioTemporalExtent],
    ClassOfIndividual => "class_of_individual": [ClassOfState],
    KindOfIndividual => "kind_of_individual": [ClassOfIndividual],
    ClassOfPossibleWorld => "class_of_possible_world": [ClassOfIndividual],
    ClassOfStateOfPhysicalObject => "class_of_state_of_physical_object": [ClassOfState],
    ClassOfPhysicalObject => "class_of_physical_object": [ClassOfIndividual, ClassOfStateOfPhysicalObject],
    KindOfPhysicalObject => "kind_of_physical_object": [ClassOfPhysicalObject, KindOfIndividual],
    ClassOfSystem => "class_of_system": [ClassOfPhysicalObject],
    KindOfSystem => "kind_of_system": [ClassOfSystem, KindOfPhysicalObject],
    ClassOfParty => "class_of_party": [ClassOfSystem],
    KindOfParty => "kind_of_party": [ClassOfParty, KindOfSystem],
    ClassOfPerson => "class_of_person": [ClassOfParty],
    KindOfPerson => "kind_of_person": [ClassOfPerson, KindOfParty],
    ClassOfOrganization => "class_of_organization": [ClassOfParty],
    KindOfOrganization => "kind_of_organization": [ClassOfOrganization, KindOfParty],
    ClassOfParticipant => "class_of_participant": [ClassOfStateOfPhysicalObject],
    Role => "role": [ClassOfParticipant],
    ClassOfActivity => "class_of_activity": [ClassOfIndividual],
    KindOfActivity => "kind_of_activity": [ClassOfActivity],
    ClassOfAssociation => "class_of_association": [ClassOfIndividual],
    KindOfAssociation => "kind_of_association": [ClassOfAssociation],
}

/// Built-in kinds whose members are instances of a component type.
pub(crate) const BUILT_IN_KINDS: &[(Capability, Capability)] = &[
    (Capability::KindOfIndividual, Capability::Individual),
    (Capability::KindOfPhysicalObject, Capability::PhysicalObject),
    (Capability::KindOfSystem, Capability::System),
    (Capability::KindOfParty, Capability::Party),
    (Capability::KindOfPerson, Capability::Person),
    (Capability::KindOfOrganization, Capability::Organization),
    (Capability::KindOfActivity, Capability::Activity),
    (Capability::KindOfAssociation, Capability::Association),
];

/// Pairs of capabilities no single entity may expose together.
pub(crate) const BUILT_IN_DISJOINT: &[(Capability, Capability)] =
    &[(Capability::AbstractObject, Capability::SpatioTemporalExtent)];

impl Display for Capability {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Capability {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}
