use loom::thread;
use quark::core::AtomId;
use quark::core::ScopeIndex;
use quark::core::Value;
use quark::vm::Vm;
use quark::vm::VmConfig;
use quark::vm::VmTemplate;
use triomphe::Arc;

fn build() -> Arc<VmTemplate> {
  let vm: Vm = Vm::template(VmConfig::new()).unwrap();

  vm.find_or_add(b"sharedName").unwrap();
  vm.global_index(&mut Value::string("shared constant"), false).unwrap();
  vm.value_index(&mut Value::number(2.5), false).unwrap();

  vm.freeze().unwrap()
}

#[test]
fn instances_read_template_concurrently() {
  loom::model(|| {
    let template: Arc<VmTemplate> = build();
    let shared: AtomId = VmTemplate::instance(&template)
      .unwrap()
      .find_or_add(b"sharedName")
      .unwrap()
      .atom()
      .unwrap();

    let spawn = |name: &'static [u8]| {
      let template: Arc<VmTemplate> = Arc::clone(&template);

      thread::spawn(move || {
        let vm: Vm = VmTemplate::instance(&template).unwrap();
        let known: Option<AtomId> = vm.find_or_add(b"sharedName").unwrap().atom();
        let novel: Option<AtomId> = vm.find_or_add(name).unwrap().atom();
        let index: ScopeIndex = vm.global_index(&mut Value::number(2.5), true).unwrap();

        (known, novel, index.slot(), vm.instance_atoms())
      })
    };

    let t1 = spawn(b"left");
    let t2 = spawn(b"right");

    let (known1, novel1, slot1, atoms1) = t1.join().unwrap();
    let (known2, novel2, slot2, atoms2) = t2.join().unwrap();

    assert_eq!(known1, Some(shared));
    assert_eq!(known2, Some(shared));
    assert_eq!(novel1, novel2, "instances issue ids independently");
    assert_eq!(slot1, 1);
    assert_eq!(slot2, 1);
    assert_eq!(atoms1, Some(1));
    assert_eq!(atoms2, Some(1));
    assert_eq!(template.values(), 2);
  });
}

#[test]
fn instance_values_stay_private() {
  loom::model(|| {
    let template: Arc<VmTemplate> = build();

    let t1 = {
      let template: Arc<VmTemplate> = Arc::clone(&template);

      thread::spawn(move || {
        let vm: Vm = VmTemplate::instance(&template).unwrap();
        vm.global_index(&mut Value::string("private"), true).unwrap();
        vm.absolute_len()
      })
    };

    let vm: Vm = VmTemplate::instance(&template).unwrap();

    assert_eq!(vm.absolute_len(), 1);
    assert_eq!(t1.join().unwrap(), 2);
    assert_eq!(vm.absolute_len(), 1, "sibling instance leaked a slot");
  });
}
