use quark::consts::ATOM_NUMBER_FLAG;
use quark::core::Atom;
use quark::core::AtomId;
use quark::core::BindingKind;
use quark::core::Keyword;
use quark::core::Level;
use quark::core::ScopeIndex;
use quark::core::ScopeType;
use quark::core::Value;
use quark::core::VmError;
use quark::core::WELL_KNOWN_COUNT;
use quark::core::WellKnown;
use quark::vm::CanonicalValue;
use quark::vm::Lexicon;
use quark::vm::Vm;
use quark::vm::VmConfig;
use quark::vm::VmTemplate;
use triomphe::Arc;

fn instance() -> Vm {
  let template: Arc<VmTemplate> = Vm::template(VmConfig::new()).unwrap().freeze().unwrap();

  VmTemplate::instance(&template).unwrap()
}

fn atom_of(vm: &Vm, text: &str) -> AtomId {
  let mut value: Value<'_> = Value::string(text);

  vm.atomize_key(&mut value).unwrap();
  value.atom().unwrap()
}

// -----------------------------------------------------------------------------
// Atom Table
// -----------------------------------------------------------------------------

#[test]
fn find_or_add_twice_yields_same_atom() {
  let vm: Vm = instance();

  for text in ["x", "fooBar", "héllo", "", "length"] {
    let first: Value<'_> = vm.find_or_add(text.as_bytes()).unwrap();
    let second: Value<'_> = vm.find_or_add(text.as_bytes()).unwrap();

    assert_eq!(first.atom(), second.atom(), "{text:?}");
    assert_eq!(first.as_str(), Some(text));
  }
}

#[test]
fn numbers_and_their_strings_share_atoms() {
  let vm: Vm = instance();

  for number in [0_u32, 1, 42, 1000, 65535, 4294967, ATOM_NUMBER_FLAG - 1] {
    let mut from_number: Value<'_> = Value::number(f64::from(number));
    let text: String = number.to_string();
    let mut from_string: Value<'_> = Value::string(&text);

    vm.atomize_key(&mut from_number).unwrap();
    vm.atomize_key(&mut from_string).unwrap();

    assert_eq!(from_number.atom(), from_string.atom(), "{number}");
    assert_eq!(from_number.atom().map(AtomId::atom), Some(Atom::Number(number)));
  }

  assert_eq!(vm.instance_atoms(), None);
}

#[test]
fn edge_case_keys() {
  let vm: Vm = instance();
  let mut zero_string: Value<'_> = Value::string("0");
  let mut zero_number: Value<'_> = Value::number(0.0);
  let mut double_zero: Value<'_> = Value::string("00");
  let mut negative_zero: Value<'_> = Value::number(-0.0);
  let mut big: Value<'_> = Value::number(4294967296.0);

  vm.atomize_key(&mut zero_string).unwrap();
  vm.atomize_key(&mut zero_number).unwrap();

  assert_eq!(zero_string.atom(), AtomId::number(0));
  assert_eq!(zero_number.atom(), AtomId::number(0));

  vm.atomize_key(&mut double_zero).unwrap();

  let double_zero: AtomId = double_zero.atom().unwrap();

  assert!(!double_zero.is_number());
  assert!(double_zero.into_raw() >= WELL_KNOWN_COUNT);

  // Takes the string path, which renders it as "0".
  let next: u32 = vm.next_atom_id();

  vm.atomize_key(&mut negative_zero).unwrap();

  assert_eq!(negative_zero.atom(), AtomId::number(0));
  assert_eq!(vm.next_atom_id(), next);

  vm.atomize_key(&mut big).unwrap();

  let big: AtomId = big.atom().unwrap();

  assert!(!big.is_number());
  assert_eq!(vm.atom_to_value(big).unwrap().as_str(), Some("4294967296"));
}

#[test]
fn negative_zero_string_is_interned() {
  let vm: Vm = instance();
  let mut value: Value<'_> = Value::string("-0");

  vm.atomize_key(&mut value).unwrap();

  assert!(!value.atom().unwrap().is_number());
}

#[test]
fn custom_shared_table_declines_across_kinds() {
  static DEFINITIONS: &[WellKnown] = &[
    WellKnown::symbol(AtomId::from_raw(7), "Symbol.seven"),
    WellKnown::string(AtomId::from_raw(8), "length", None),
  ];

  let template: Arc<VmTemplate> = Vm::template_with(VmConfig::new(), DEFINITIONS)
    .unwrap()
    .freeze()
    .unwrap();

  let vm: Vm = VmTemplate::instance(&template).unwrap();

  assert!(vm.symbol(AtomId::from_raw(7)).is_some());
  assert_eq!(vm.find_or_add(b"length").unwrap().atom(), Some(AtomId::from_raw(8)));
  assert!(vm.symbol(AtomId::from_raw(8)).is_none());
  assert_eq!(vm.instance_atoms(), None);
  assert_eq!(vm.next_atom_id(), 9);
}

#[test]
fn id_generator_never_wraps() {
  let mut config: VmConfig = VmConfig::new();

  config.atom_id_limit = WELL_KNOWN_COUNT + 2;

  let vm: Vm = Vm::template(config).unwrap();

  vm.find_or_add(b"one").unwrap();
  vm.find_or_add(b"two").unwrap();

  assert_eq!(vm.find_or_add(b"three"), Err(VmError::TooManyAtoms));
  assert_eq!(vm.symbol_add(&mut Value::symbol(None)), Err(VmError::TooManyAtoms));
  assert!(vm.find_or_add(b"one").is_ok());
}

#[test]
fn template_atoms_visible_to_instances() {
  let vm: Vm = Vm::template(VmConfig::new()).unwrap();
  let atom: AtomId = vm.find_or_add(b"builtinMethod").unwrap().atom().unwrap();
  let template: Arc<VmTemplate> = vm.freeze().unwrap();
  let instance: Vm = VmTemplate::instance(&template).unwrap();

  assert_eq!(instance.find_or_add(b"builtinMethod").unwrap().atom(), Some(atom));
  assert_eq!(instance.next_atom_id(), atom.into_raw() + 1);
  assert_eq!(instance.instance_atoms(), None);
}

#[test]
fn lexicon_classifies_keywords() {
  let vm: Vm = instance();
  let mut lexicon: Lexicon<'_> = Lexicon::new(&vm);

  assert_eq!(lexicon.identifier(b"return").unwrap().keyword(), Some(Keyword::Return));
  assert_eq!(lexicon.identifier(b"returns").unwrap().keyword(), None);
  assert_eq!(atom_of(&vm, "return"), AtomId::KW_RETURN);
}

// -----------------------------------------------------------------------------
// Scope Storage
// -----------------------------------------------------------------------------

#[test]
fn scope_index_round_trip() {
  let scopes: [ScopeType; 3] = [ScopeType::Global, ScopeType::Function, ScopeType::Block];
  let levels: [Level; 2] = [Level::Local, Level::Static];
  let kinds: [BindingKind; 5] = [
    BindingKind::Var,
    BindingKind::Let,
    BindingKind::Catch,
    BindingKind::Const,
    BindingKind::Function,
  ];

  for scope in scopes {
    for level in levels {
      for kind in kinds {
        for slot in [0, ScopeIndex::MAX_SLOT] {
          let index: ScopeIndex = ScopeIndex::new(scope, slot, level, kind).unwrap();

          assert_eq!(index.decode(), (scope, slot, level, kind));
        }
      }
    }
  }
}

#[test]
fn value_index_reuses_block_without_allocating() {
  let vm: Vm = instance();
  let first: *const CanonicalValue = vm.value_index(&mut Value::string("repeat me"), true).unwrap();
  let allocations: usize = vm.allocations();
  let second: *const CanonicalValue = vm.value_index(&mut Value::string("repeat me"), true).unwrap();

  assert_eq!(first, second);
  assert_eq!(vm.allocations(), allocations);
}

#[test]
fn global_index_collapses_equal_content() {
  let vm: Vm = instance();
  let left: String = String::from("same content");
  let right: String = String::from("same content");
  let before: usize = vm.absolute_len();

  let a: ScopeIndex = vm.global_index(&mut Value::string(&left), true).unwrap();
  let b: ScopeIndex = vm.global_index(&mut Value::string(&right), true).unwrap();

  assert_eq!(a, b);
  assert_eq!(vm.absolute_len(), before + 1);
  assert_eq!(a.level(), Level::Static);
  assert_eq!(vm.scope_value(a).unwrap().value().as_str(), Some("same content"));
}

#[test]
fn absolute_array_grows_past_initial_capacity() {
  let vm: Vm = instance();
  let mut indices: Vec<ScopeIndex> = Vec::new();

  for number in 0..100 {
    indices.push(vm.global_index(&mut Value::number(f64::from(number)), true).unwrap());
  }

  assert_eq!(vm.absolute_len(), 100);

  for (number, index) in indices.into_iter().enumerate() {
    assert_eq!(index.slot(), number as u32);
    assert_eq!(vm.scope_value(index).unwrap().value(), Value::number(number as f64));
  }
}

#[test]
fn long_multibyte_constants_keep_offsets() {
  let vm: Vm = instance();
  let text: String = "ünïcödé ".repeat(10);
  let canonical: &CanonicalValue = vm.value_index(&mut Value::string(&text), true).unwrap();

  assert!(canonical.has_offset_map());

  for (char_index, (offset, _)) in text.char_indices().enumerate() {
    assert_eq!(canonical.char_offset(char_index as u32), Some(offset));
  }
}
