use cnd::header::FILE_TYPE_WORLD;
use cnd::math::{Color, Vector2f, Vector3f};
use cnd::sections::georesource::{self, Georesource, Surface, SurfaceAdjoin};
use cnd::sections::keyframes::{self, Animation, KeyMarker, KeyNode, KeyNodeEntry};
use cnd::sections::materials::{self, Material};
use cnd::sections::names::NameSection;
use cnd::sections::sectors::{self, Sector};
use cnd::world::RawSection;
use cnd::{CndHeader, CndName, CndWorld, Error, FileStream, InputStream, MemoryStream, Stream, HEADER_SIZE};

fn name(s: &str) -> CndName {
    CndName::new(s).unwrap()
}

fn material(mat_name: &str, width: u32, height: u32, bpp: u32, mip_levels: u32) -> Material {
    let size = Material::pixel_data_size(width, height, bpp, mip_levels).unwrap();
    Material {
        name: name(mat_name),
        width,
        height,
        bpp,
        mip_levels,
        pixel_data: (0..size).map(|i| i as u8).collect(),
    }
}

/// A small but fully populated world touching every section family.
fn sample_world() -> CndWorld {
    let mut world = CndWorld {
        header: CndHeader {
            copyright: cnd::FixedString::new("................(c)2026 test fixture").unwrap(),
            file_path: cnd::FixedString::new("ndy\\fixture.cnd").unwrap(),
            file_type: FILE_TYPE_WORLD,
            version: 3,
            world_gravity: 4.0,
            ceiling_sky_z: 20.0,
            horizon_distance: 200.0,
            horizon_sky_offset: Vector2f::new(0.0, 0.25),
            fog: cnd::header::CndFog {
                enabled: 1,
                color: Color::new(0.5, 0.5, 0.55, 1.0),
                start_depth: 0.1,
                end_depth: 80.0,
            },
            num_sounds: 11,
            ..Default::default()
        },
        ..Default::default()
    };

    world
        .materials
        .insert("00_wall.mat".into(), material("00_wall.mat", 4, 4, 32, 2));
    world
        .materials
        .insert("01_floor.mat".into(), material("01_floor.mat", 2, 2, 16, 1));

    world.georesource = Georesource {
        vertices: vec![
            Vector3f::new(0.0, 0.0, 0.0),
            Vector3f::new(1.0, 0.0, 0.0),
            Vector3f::new(1.0, 1.0, 0.0),
            Vector3f::new(0.0, 1.0, 0.0),
        ],
        tex_vertices: vec![
            Vector2f::new(0.0, 0.0),
            Vector2f::new(1.0, 0.0),
            Vector2f::new(1.0, 1.0),
            Vector2f::new(0.0, 1.0),
        ],
        adjoins: vec![SurfaceAdjoin {
            flags: 1,
            mirror: -1,
            distance: 0.5,
        }],
        surfaces: vec![Surface {
            material: 0,
            flags: 0x20,
            geo_mode: 4,
            light_mode: 3,
            adjoin: 0,
            extra_light: Color::default(),
            normal: Vector3f::new(0.0, 0.0, 1.0),
            first_vertex: 0,
            first_tex_vertex: 0,
            vertex_count: 4,
        }],
    };

    world.sectors = (0..3)
        .map(|i| Sector {
            flags: i,
            ambient_light: Color::new(0.2, 0.2, 0.2, 1.0),
            tint: Vector3f::new(0.0, 0.1, 0.0),
            bound_min: Vector3f::new(-1.0, -1.0, -1.0),
            bound_max: Vector3f::new(1.0, 1.0, 1.0),
            center: Vector3f::default(),
            radius: 1.5,
            first_surface: 0,
            surface_count: 1,
            first_adjoin: 0,
            adjoin_count: 1,
            ..Default::default()
        })
        .collect();

    world.ai_classes = vec![name("ranger.ai"), name("mole.ai")];
    world.models = vec![name("indy.3do")];
    world.sprites = vec![];

    world.keyframes.insert(
        "walk.key".into(),
        Animation {
            name: name("walk.key"),
            flags: 0,
            kind: 1,
            frame_count: 20,
            fps: 30.0,
            markers: vec![KeyMarker { frame: 10.0, kind: 2 }],
            nodes: vec![
                KeyNode {
                    node_id: 0,
                    entries: vec![
                        KeyNodeEntry {
                            frame: 0.0,
                            flags: 0,
                            position: Vector3f::new(0.0, 0.0, 0.0),
                            orientation: Vector3f::default(),
                            delta_position: Vector3f::new(0.1, 0.0, 0.0),
                            delta_orientation: Vector3f::default(),
                        },
                        KeyNodeEntry {
                            frame: 10.0,
                            flags: 1,
                            position: Vector3f::new(1.0, 0.0, 0.0),
                            ..Default::default()
                        },
                    ],
                },
                KeyNode {
                    node_id: 3,
                    entries: vec![],
                },
            ],
        },
    );
    world.keyframes.insert(
        "run.key".into(),
        Animation {
            name: name("run.key"),
            flags: 4,
            kind: 1,
            frame_count: 12,
            fps: 60.0,
            markers: vec![],
            nodes: vec![KeyNode {
                node_id: 0,
                entries: vec![KeyNodeEntry::default()],
            }],
        },
    );

    world.anim_classes = vec![name("indy.pup")];
    world.sound_classes = vec![name("indy.snd")];
    world.cog_scripts = vec![name("door.cog"), name("elevator.cog")];

    world.cogs = RawSection {
        count: 2,
        data: vec![0xAA; 24],
    };
    world.thing_templates = RawSection {
        count: 1,
        data: vec![0xBB; 16],
    };
    world.things = RawSection {
        count: 3,
        data: vec![0xCC; 40],
    };
    world.pvs = vec![0xDD; 32];

    // Keep the stored header consistent with the collections so whole-value
    // equality works after a round trip.
    world.header = world.recompute_header();
    world
}

fn world_bytes(world: &CndWorld) -> Vec<u8> {
    let mut stream = MemoryStream::new();
    world.write(&mut stream).unwrap();
    stream.into_inner()
}

#[test]
fn container_round_trips_byte_exact() {
    let world = sample_world();
    let bytes = world_bytes(&world);
    assert_eq!(bytes.len() as u32, world.header.file_size);

    let mut stream = MemoryStream::from_vec(bytes.clone());
    let back = CndWorld::read(&mut stream).unwrap();
    assert_eq!(back, world);

    // Writing the re-read world reproduces the original bytes exactly.
    assert_eq!(world_bytes(&back), bytes);
}

#[test]
fn keyed_sections_preserve_file_order() {
    let world = sample_world();
    let mut stream = MemoryStream::from_vec(world_bytes(&world));
    let back = CndWorld::read(&mut stream).unwrap();

    let names: Vec<&str> = back.materials.keys().map(String::as_str).collect();
    assert_eq!(names, ["00_wall.mat", "01_floor.mat"]);
    let keys: Vec<&str> = back.keyframes.keys().map(String::as_str).collect();
    assert_eq!(keys, ["walk.key", "run.key"]);
}

#[test]
fn section_offsets_are_contiguous() {
    let world = sample_world();
    let header = &world.header;

    assert_eq!(materials::offset(header), HEADER_SIZE);
    assert_eq!(
        materials::offset(header) + header.size_materials as u64,
        georesource::offset(header)
    );
    assert_eq!(
        georesource::offset(header) + georesource::declared_size(header),
        sectors::offset(header)
    );
    assert_eq!(
        sectors::offset(header) + sectors::declared_size(header),
        NameSection::AiClass.offset(header)
    );
    assert_eq!(
        NameSection::AiClass.offset(header) + header.size_ai_classes as u64,
        NameSection::Models.offset(header)
    );
    assert_eq!(
        NameSection::Models.offset(header) + header.size_models as u64,
        NameSection::Sprites.offset(header)
    );
    assert_eq!(
        NameSection::Sprites.offset(header) + header.size_sprites as u64,
        keyframes::offset(header)
    );
    assert_eq!(
        keyframes::offset(header) + header.size_keyframes as u64,
        NameSection::AnimClass.offset(header)
    );
    assert_eq!(
        NameSection::AnimClass.offset(header) + header.size_puppets as u64,
        NameSection::SoundClass.offset(header)
    );
    assert_eq!(
        NameSection::SoundClass.offset(header) + header.size_sound_classes as u64,
        NameSection::CogScript.offset(header)
    );

    // The trailing opaque sections account for the rest of the file.
    let trailing = header.size_cogs as u64
        + header.size_thing_templates as u64
        + header.size_things as u64
        + header.pvs_size as u64;
    assert_eq!(
        NameSection::CogScript.offset(header) + header.size_cog_scripts as u64 + trailing,
        header.file_size as u64
    );
}

#[test]
fn sequential_parse_consumes_exact_byte_ranges() {
    let world = sample_world();
    let mut stream = MemoryStream::from_vec(world_bytes(&world));

    let header = CndHeader::read(&mut stream).unwrap();
    assert_eq!(header.num_materials, 2);
    assert_eq!(header.num_sectors, 3);
    assert_eq!(stream.tell(), materials::offset(&header));

    let mats = materials::parse(&mut stream, &header).unwrap();
    assert_eq!(mats.len(), 2);
    assert_eq!(stream.tell(), georesource::offset(&header));

    let geo = georesource::parse(&mut stream, &header).unwrap();
    assert_eq!(geo.vertices.len(), 4);
    assert_eq!(stream.tell(), sectors::offset(&header));

    let sec = sectors::parse(&mut stream, &header).unwrap();
    assert_eq!(sec.len(), 3);
    assert_eq!(
        stream.tell(),
        sectors::offset(&header) + sectors::byte_size(&sec)
    );
}

#[test]
fn convenience_readers_seek_for_themselves() {
    let world = sample_world();
    let mut stream = MemoryStream::from_vec(world_bytes(&world));

    // Deliberately park the cursor somewhere irrelevant first.
    stream.seek(17).unwrap();
    let sec = sectors::read(&mut stream).unwrap();
    assert_eq!(sec, world.sectors);

    stream.seek(9999).unwrap();
    let models = NameSection::Models.read(&mut stream).unwrap();
    assert_eq!(models, world.models);

    let mats = materials::read(&mut stream).unwrap();
    assert_eq!(mats, world.materials);
}

#[test]
fn truncated_georesource_names_the_section() {
    let world = sample_world();
    let mut bytes = world_bytes(&world);
    // Chop the file 4 bytes short of the georesource element data, so the
    // counts declared in the header no longer fit the stream.
    let cut = sectors::offset(&world.header) as usize - 4;
    bytes.truncate(cut);

    let mut stream = MemoryStream::from_vec(bytes);
    match CndWorld::read(&mut stream) {
        Err(Error::SectionDecode { section, .. }) => assert_eq!(section, "georesource"),
        other => panic!("expected georesource decode error, got {other:?}"),
    }
}

#[test]
fn duplicate_material_names_are_rejected() {
    let world = sample_world();
    let mut bytes = world_bytes(&world);

    // Overwrite the second material's 64-byte name field with the first's.
    let first_record = materials::offset(&world.header) as usize;
    let second_record = first_record + world.materials[0].record_size() as usize;
    let name0 = bytes[first_record..first_record + 64].to_vec();
    bytes[second_record..second_record + 64].copy_from_slice(&name0);

    let mut stream = MemoryStream::from_vec(bytes);
    match CndWorld::read(&mut stream) {
        Err(Error::SectionDecode { section, message, .. }) => {
            assert_eq!(section, "materials");
            assert!(message.contains("duplicate"), "message: {message}");
        }
        other => panic!("expected duplicate-name error, got {other:?}"),
    }
}

#[test]
fn replace_material_keeps_key_order() {
    let mut world = sample_world();
    let replacement = material("01_floor.mat", 4, 4, 32, 1);
    assert!(world.replace_material(replacement.clone()));
    assert!(!world.replace_material(material("missing.mat", 2, 2, 16, 1)));

    let mut stream = MemoryStream::from_vec(world_bytes(&world));
    let back = CndWorld::read(&mut stream).unwrap();
    let names: Vec<&str> = back.materials.keys().map(String::as_str).collect();
    assert_eq!(names, ["00_wall.mat", "01_floor.mat"]);
    assert_eq!(back.materials["01_floor.mat"], replacement);
}

#[test]
fn file_streams_round_trip_and_enforce_capabilities() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fixture.cnd");

    let world = sample_world();
    let mut out = FileStream::create(&path).unwrap();
    world.write(&mut out).unwrap();
    drop(out);

    let mut input = FileStream::open(&path).unwrap();
    assert!(!input.can_write());
    let back = CndWorld::read(&mut input).unwrap();
    assert_eq!(back, world);

    // A write on the read-only stream fails fast with the usage error.
    assert!(matches!(world.write(&mut input), Err(Error::NotWritable)));
}

#[test]
fn read_only_view_still_parses() {
    let world = sample_world();
    let mut view = InputStream::new(MemoryStream::from_vec(world_bytes(&world)));
    let back = CndWorld::read(&mut view).unwrap();
    assert_eq!(back, world);
    assert!(matches!(world.write(&mut view), Err(Error::NotWritable)));
}
