use combat_core::prelude::*;
use mech_core::Component;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const FACINGS: [Facing; 4] = [Facing::Front, Facing::Left, Facing::Right, Facing::Rear];

fn crit_heavy_unit() -> UnitDefinition {
    UnitDefinition::new("Crit Bait", 50)
        .with_location(
            LocationDefinition::new(Location::Head, 9, 3)
                .with_slots(vec![Component::Cockpit, Component::Sensors]),
        )
        .with_location(
            LocationDefinition::new(Location::CenterTorso, 20, 16)
                .with_rear_armor(6)
                .with_slots(vec![
                    Component::Engine,
                    Component::Engine,
                    Component::Gyro,
                    Component::Weapon(0),
                ]),
        )
        .with_location(
            LocationDefinition::new(Location::LeftTorso, 15, 12)
                .with_rear_armor(4)
                .with_slots(vec![Component::Ammo(0), Component::HeatSink]),
        )
        .with_location(
            LocationDefinition::new(Location::RightTorso, 15, 12)
                .with_rear_armor(4)
                .with_slots(vec![Component::Weapon(1)]),
        )
        .with_location(
            LocationDefinition::new(Location::LeftArm, 10, 8)
                .with_slots(vec![Component::Actuator, Component::Actuator]),
        )
        .with_weapon(
            WeaponInstance::new("AC/10", 10, 3, [0, 5, 10, 15]).with_ammo(10),
            Location::CenterTorso,
        )
        .with_weapon(
            WeaponInstance::new("Large Laser", 8, 8, [0, 5, 10, 15]),
            Location::RightTorso,
        )
}

proptest! {
    #[test]
    fn armor_and_structure_stay_in_bounds(
        hits in prop::collection::vec((0usize..8, 0u32..60, 0usize..4), 1..50),
        seed in any::<u64>(),
    ) {
        let def = crit_heavy_unit();
        let tables = TableSet::default();
        let mut unit = UnitState::new(&def);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        for (location, amount, facing) in hits {
            if unit.is_destroyed() {
                break;
            }
            unit.apply_damage(
                Location::all()[location],
                amount,
                FACINGS[facing],
                &tables.critical,
                &mut rng,
            )
            .unwrap();

            for (state, base) in unit.locations.iter().zip(&def.locations) {
                prop_assert!(state.armor <= base.armor);
                prop_assert!(state.rear_armor <= base.rear_armor);
                prop_assert!(state.structure <= base.structure);
                if state.destroyed {
                    prop_assert_eq!(state.structure, 0);
                }
            }
            let fraction = unit.structure_fraction();
            prop_assert!((0.0..=1.0).contains(&fraction));
            prop_assert!(unit.heat_sinks_lost <= def.heat_sinks);
        }
    }

    #[test]
    fn removed_points_never_exceed_damage_without_slots(
        location in 0usize..8,
        amount in 0u32..200,
        seed in any::<u64>(),
    ) {
        let def = UnitDefinition::new("Plain", 50)
            .with_location(LocationDefinition::new(Location::Head, 9, 3))
            .with_location(LocationDefinition::new(Location::CenterTorso, 20, 16))
            .with_location(LocationDefinition::new(Location::LeftTorso, 15, 12))
            .with_location(LocationDefinition::new(Location::RightTorso, 15, 12));
        let mut unit = UnitState::new(&def);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let result = unit
            .apply_damage(
                Location::all()[location],
                amount,
                Facing::Front,
                &TableSet::default().critical,
                &mut rng,
            )
            .unwrap();
        prop_assert!(result.armor_damage + result.structure_damage <= amount);
        prop_assert_eq!(
            unit.remaining_points(),
            def.total_armor() + def.total_structure() - result.armor_damage - result.structure_damage
        );
    }
}
