//! # Equipment Sync Tests
//!
//! One server session and several client sessions over the loopback hub:
//!
//! 1. **Convergence**: late observers catch up through a request
//! 2. **Push**: inventory changes reach every observer
//! 3. **Config**: owner pushes change what is mounted, others are ignored
//! 4. **Rendering**: packs move the shield, held items are not drawn twice
//!
//! Run with: cargo test -p panoply --test equipment_sync

use std::sync::Arc;

use panoply::equipment::{MemoryInventory, PlayerInventories};
use panoply::networking::{LoopbackClient, LoopbackHub, LoopbackServer};
use panoply::rendering::{
    CustomTransform, MockAssetBackend, MockSkeleton, RecordingDrawSink, RenderStage,
};
use panoply::shared::{
    BackpackState, EquipmentSlot, Feature, ItemStack, PanoplySettings, PlayerId, RenderConfig,
    ToolKind,
};
use panoply::{ClientSession, ServerSession};

// ============================================================================
// FIXTURE
// ============================================================================

fn assets() -> Arc<MockAssetBackend> {
    let mut assets = MockAssetBackend::new();
    assets.register("game:knife-flint", "game:item/tool/knife");
    assets.register("game:chisel-copper", "game:item/tool/chisel");
    assets.register("game:axe-felling-iron", "game:item/tool/axe");
    assets.register("game:hammer-iron", "game:item/tool/hammer");
    assets.register("game:shield-wood", "game:item/tool/shield");
    Arc::new(assets)
}

struct Player {
    id: PlayerId,
    hotbar: Arc<MemoryInventory>,
    pack: Arc<MemoryInventory>,
}

impl Player {
    fn new(name: &str) -> Self {
        Self {
            id: PlayerId::new(name),
            hotbar: Arc::new(MemoryInventory::new("hotbar", 10)),
            pack: Arc::new(MemoryInventory::with_pack_slots("backpack", 4, 8)),
        }
    }

    fn inventories(&self) -> PlayerInventories {
        PlayerInventories::new()
            .with_tools(self.hotbar.clone())
            .with_pack(self.pack.clone())
    }
}

struct World {
    hub: LoopbackHub,
    server: ServerSession<LoopbackServer>,
}

impl World {
    fn new() -> Self {
        let hub = LoopbackHub::new();
        let server = ServerSession::new(hub.server(), PanoplySettings::default());
        Self { hub, server }
    }

    fn client(&self, local: &str) -> ClientSession<LoopbackClient> {
        ClientSession::new(
            PlayerId::new(local),
            self.hub.connect(),
            assets(),
            &PanoplySettings::default(),
        )
    }

    /// Lets packets travel both ways and be handled.
    fn settle(&mut self, clients: &mut [&mut ClientSession<LoopbackClient>]) {
        for _ in 0..2 {
            self.server.tick();
            for client in clients.iter_mut() {
                client.poll_network();
            }
        }
    }
}

fn knife() -> ItemStack {
    ItemStack::tool("game:knife-flint", ToolKind::Knife)
}

fn draw(client: &ClientSession<LoopbackClient>, player: &PlayerId, skeleton: &MockSkeleton) -> RecordingDrawSink {
    let mut sink = RecordingDrawSink::new();
    client.render_frame(player, RenderStage::Opaque, skeleton, &mut sink);
    sink
}

// ============================================================================
// CONVERGENCE
// ============================================================================

#[test]
fn test_late_observer_converges_through_request() {
    let mut world = World::new();
    let alice = Player::new("alice");
    alice.hotbar.set(0, Some(knife()));
    alice.hotbar.set(1, Some(ItemStack::tool("game:axe-felling-iron", ToolKind::Axe)));
    world
        .server
        .player_joined(alice.id.clone(), alice.inventories(), None, None)
        .unwrap();
    world.server.tick();

    let mut bob = world.client("bob");
    bob.player_spawned(alice.id.clone());
    world.settle(&mut [&mut bob]);

    let renderer = bob.renderer(&alice.id).unwrap();
    assert_eq!(renderer.mounted_code(EquipmentSlot::LeftForearm), Some("game:knife-flint"));
    assert_eq!(renderer.mounted_code(EquipmentSlot::BackPrimary), Some("game:axe-felling-iron"));
    assert_eq!(draw(&bob, &alice.id, &MockSkeleton::humanoid()).calls.len(), 2);
}

#[test]
fn test_observer_without_snapshot_draws_nothing() {
    let world = World::new();
    let mut bob = world.client("bob");
    let alice = PlayerId::new("alice");
    bob.player_spawned(alice.clone());

    assert_eq!(bob.poll_network(), 0);
    assert!(draw(&bob, &alice, &MockSkeleton::humanoid()).calls.is_empty());
}

#[test]
fn test_observer_polling_before_spawn_converges_through_request() {
    let mut world = World::new();
    let mut bob = world.client("bob");
    let alice = Player::new("alice");
    alice.hotbar.set(0, Some(knife()));
    world
        .server
        .player_joined(alice.id.clone(), alice.inventories(), None, None)
        .unwrap();

    // Bob receives alice's first snapshot while she is still out of view.
    world.settle(&mut [&mut bob]);
    assert!(bob.renderer(&alice.id).is_none());

    bob.player_spawned(alice.id.clone());
    world.settle(&mut [&mut bob]);
    assert_eq!(
        bob.renderer(&alice.id).unwrap().mounted_code(EquipmentSlot::LeftForearm),
        Some("game:knife-flint")
    );
}

#[test]
fn test_change_out_of_view_seen_after_respawn() {
    let mut world = World::new();
    let mut bob = world.client("bob");
    let alice = Player::new("alice");
    alice.hotbar.set(0, Some(knife()));
    world
        .server
        .player_joined(alice.id.clone(), alice.inventories(), None, None)
        .unwrap();

    bob.player_spawned(alice.id.clone());
    world.settle(&mut [&mut bob]);
    bob.player_despawned(&alice.id);

    alice.hotbar.clear_slot(0);
    alice.hotbar.set(1, Some(ItemStack::tool("game:axe-felling-iron", ToolKind::Axe)));
    world.settle(&mut [&mut bob]);
    assert!(bob.renderer(&alice.id).is_none());

    bob.player_spawned(alice.id.clone());
    world.settle(&mut [&mut bob]);
    let renderer = bob.renderer(&alice.id).unwrap();
    assert_eq!(renderer.mounted_code(EquipmentSlot::LeftForearm), None);
    assert_eq!(renderer.mounted_code(EquipmentSlot::BackPrimary), Some("game:axe-felling-iron"));
    assert_eq!(
        renderer.last_sequence(),
        Some(world.server.watcher(&alice.id).unwrap().current_message().sequence)
    );
}

// ============================================================================
// PUSH
// ============================================================================

#[test]
fn test_inventory_change_reaches_every_observer() {
    let mut world = World::new();
    let alice = Player::new("alice");
    world
        .server
        .player_joined(alice.id.clone(), alice.inventories(), None, None)
        .unwrap();

    let mut bob = world.client("bob");
    let mut carol = world.client("carol");
    bob.player_spawned(alice.id.clone());
    carol.player_spawned(alice.id.clone());
    world.settle(&mut [&mut bob, &mut carol]);

    alice.hotbar.set(3, Some(knife()));
    world.settle(&mut [&mut bob, &mut carol]);

    for observer in [&bob, &carol] {
        assert_eq!(
            observer.renderer(&alice.id).unwrap().mounted_code(EquipmentSlot::LeftForearm),
            Some("game:knife-flint")
        );
    }

    alice.hotbar.clear_slot(3);
    world.settle(&mut [&mut bob, &mut carol]);
    assert_eq!(bob.renderer(&alice.id).unwrap().occupied_count(), 0);
    assert_eq!(carol.renderer(&alice.id).unwrap().occupied_count(), 0);
}

#[test]
fn test_first_found_first_served_across_the_wire() {
    let mut world = World::new();
    let alice = Player::new("alice");
    alice.hotbar.set(1, Some(knife()));
    alice.hotbar.set(3, Some(ItemStack::tool("game:chisel-copper", ToolKind::Chisel)));
    alice.hotbar.set(5, Some(knife()));
    world
        .server
        .player_joined(alice.id.clone(), alice.inventories(), None, None)
        .unwrap();

    let mut bob = world.client("bob");
    bob.player_spawned(alice.id.clone());
    world.settle(&mut [&mut bob]);

    let renderer = bob.renderer(&alice.id).unwrap();
    assert_eq!(renderer.mounted_code(EquipmentSlot::LeftForearm), Some("game:knife-flint"));
    assert_eq!(renderer.mounted_code(EquipmentSlot::RightForearm), Some("game:chisel-copper"));
    assert_eq!(renderer.occupied_count(), 2);
}

#[test]
fn test_rejoin_keeps_sequence_rising() {
    let mut world = World::new();
    let alice = Player::new("alice");
    world
        .server
        .player_joined(alice.id.clone(), alice.inventories(), None, None)
        .unwrap();

    let mut bob = world.client("bob");
    bob.player_spawned(alice.id.clone());
    world.settle(&mut [&mut bob]);
    let before = bob.renderer(&alice.id).unwrap().last_sequence().unwrap();

    world.server.player_left(&alice.id);
    alice.hotbar.set(0, Some(knife()));
    world
        .server
        .player_joined(alice.id.clone(), alice.inventories(), None, None)
        .unwrap();
    world.settle(&mut [&mut bob]);

    let renderer = bob.renderer(&alice.id).unwrap();
    assert!(renderer.last_sequence().unwrap() > before);
    assert_eq!(renderer.mounted_code(EquipmentSlot::LeftForearm), Some("game:knife-flint"));
}

// ============================================================================
// CONFIG
// ============================================================================

#[test]
fn test_owner_config_push_clears_disabled_slots() {
    let mut world = World::new();
    let alice = Player::new("alice");
    alice.hotbar.set(0, Some(knife()));
    alice.hotbar.set(1, Some(ItemStack::shield("game:shield-wood")));

    let mut alice_client = world.client("alice");
    let owner = alice_client.transport().peer_id();
    world
        .server
        .player_joined(alice.id.clone(), alice.inventories(), None, Some(owner))
        .unwrap();

    let mut bob = world.client("bob");
    bob.player_spawned(alice.id.clone());
    world.settle(&mut [&mut bob, &mut alice_client]);
    assert_eq!(bob.renderer(&alice.id).unwrap().occupied_count(), 2);

    let mut config = RenderConfig::default();
    config.set_feature(Feature::Forearm, false);
    alice_client.push_config(&config).unwrap();
    world.settle(&mut [&mut bob, &mut alice_client]);

    let renderer = bob.renderer(&alice.id).unwrap();
    assert_eq!(renderer.mounted_code(EquipmentSlot::LeftForearm), None);
    assert_eq!(renderer.mounted_code(EquipmentSlot::Shield), Some("game:shield-wood"));
    assert!(!world.server.watcher(&alice.id).unwrap().config().forearm_enabled);
}

#[test]
fn test_config_push_from_other_player_ignored() {
    let mut world = World::new();
    let alice = Player::new("alice");
    alice.hotbar.set(0, Some(knife()));
    world
        .server
        .player_joined(alice.id.clone(), alice.inventories(), None, None)
        .unwrap();

    // An unbound peer claims to be alice.
    let mut impostor = world.client("alice");
    impostor.push_config(&RenderConfig::disabled()).unwrap();
    let report = world.server.tick();

    assert_eq!(report.configs_applied, 0);
    assert!(world.server.watcher(&alice.id).unwrap().config().forearm_enabled);
}

#[test]
fn test_favorites_limit_what_is_mounted() {
    let mut world = World::new();
    let alice = Player::new("alice");
    alice.hotbar.set(0, Some(knife()));
    alice.hotbar.set(2, Some(ItemStack::tool("game:axe-felling-iron", ToolKind::Axe)));

    let mut config = RenderConfig::default();
    config.set_feature(Feature::Favorites, true);
    config.set_favorites(&[2]);
    world
        .server
        .player_joined(alice.id.clone(), alice.inventories(), Some(config), None)
        .unwrap();

    let mut bob = world.client("bob");
    bob.player_spawned(alice.id.clone());
    world.settle(&mut [&mut bob]);

    let renderer = bob.renderer(&alice.id).unwrap();
    assert_eq!(renderer.occupied_count(), 1);
    assert_eq!(renderer.mounted_code(EquipmentSlot::BackPrimary), Some("game:axe-felling-iron"));
}

// ============================================================================
// RENDERING
// ============================================================================

#[test]
fn test_backpack_moves_shield_and_back_offset() {
    let mut world = World::new();
    let alice = Player::new("alice");
    alice.hotbar.set(0, Some(ItemStack::tool("game:axe-felling-iron", ToolKind::Axe)));
    alice.hotbar.set(1, Some(ItemStack::shield("game:shield-wood")));
    world
        .server
        .player_joined(alice.id.clone(), alice.inventories(), None, None)
        .unwrap();

    let mut bob = world.client("bob");
    bob.player_spawned(alice.id.clone());
    world.settle(&mut [&mut bob]);
    {
        let renderer = bob.renderer(&alice.id).unwrap();
        assert_eq!(renderer.backpack(), BackpackState::None);
        assert!(renderer.back_offset() > 0.0);
    }
    let bare = draw(&bob, &alice.id, &MockSkeleton::humanoid());

    alice.pack.set(0, Some(ItemStack::other("game:backpack")));
    world.settle(&mut [&mut bob]);
    let renderer = bob.renderer(&alice.id).unwrap();
    assert_eq!(renderer.backpack(), BackpackState::Leather);
    assert!(renderer.back_offset().abs() < f32::EPSILON);

    let packed = draw(&bob, &alice.id, &MockSkeleton::humanoid());
    let shield_model = |sink: &RecordingDrawSink| {
        sink.calls
            .iter()
            .find(|call| call.slot == EquipmentSlot::Shield)
            .map(|call| call.model)
    };
    assert_ne!(shield_model(&bare), shield_model(&packed));
    assert_eq!(CustomTransform::for_backpack(renderer.backpack()), CustomTransform::ShieldOnBackpack);
}

#[test]
fn test_held_item_and_first_person_skips() {
    let mut world = World::new();
    let alice = Player::new("alice");
    alice.hotbar.set(0, Some(knife()));
    alice.hotbar.set(1, Some(ItemStack::tool("game:hammer-iron", ToolKind::Hammer)));
    world
        .server
        .player_joined(alice.id.clone(), alice.inventories(), None, None)
        .unwrap();

    let mut bob = world.client("bob");
    bob.player_spawned(alice.id.clone());
    world.settle(&mut [&mut bob]);

    let mut skeleton = MockSkeleton::humanoid();
    skeleton.main_hand = Some("game:knife-flint".to_owned());
    let sink = draw(&bob, &alice.id, &skeleton);
    assert_eq!(sink.calls.len(), 1);
    assert_eq!(sink.calls[0].slot, EquipmentSlot::BackPrimary);

    skeleton.local_first_person = true;
    assert!(draw(&bob, &alice.id, &skeleton).calls.is_empty());
}

#[test]
fn test_meshes_shared_and_rebuilt_on_reload() {
    let mut world = World::new();
    let alice = Player::new("alice");
    let dave = Player::new("dave");
    alice.hotbar.set(0, Some(knife()));
    dave.hotbar.set(4, Some(knife()));
    for player in [&alice, &dave] {
        world
            .server
            .player_joined(player.id.clone(), player.inventories(), None, None)
            .unwrap();
    }

    let mut bob = world.client("bob");
    bob.player_spawned(alice.id.clone());
    bob.player_spawned(dave.id.clone());
    world.settle(&mut [&mut bob]);

    assert_eq!(bob.cache().len(), 1);
    let misses = bob.cache().stats().misses;
    assert_eq!(misses, 1);

    bob.assets_reloaded();
    assert_eq!(bob.cache().stats().misses, 2);
    assert_eq!(draw(&bob, &dave.id, &MockSkeleton::humanoid()).calls.len(), 1);
}

#[test]
fn test_despawn_then_respawn_accepts_current_state() {
    let mut world = World::new();
    let alice = Player::new("alice");
    alice.hotbar.set(0, Some(knife()));
    world
        .server
        .player_joined(alice.id.clone(), alice.inventories(), None, None)
        .unwrap();

    let mut bob = world.client("bob");
    bob.player_spawned(alice.id.clone());
    world.settle(&mut [&mut bob]);

    bob.player_despawned(&alice.id);
    assert!(bob.renderer(&alice.id).is_none());

    bob.player_spawned(alice.id.clone());
    world.settle(&mut [&mut bob]);
    assert_eq!(
        bob.renderer(&alice.id).unwrap().mounted_code(EquipmentSlot::LeftForearm),
        Some("game:knife-flint")
    );
}
