use deviceguard_domain::probe::BuildField;
use std::collections::BTreeMap;

/// Android system properties backing each build field.
pub const BUILD_PROP_KEYS: [(BuildField, &str); 6] = [
    (BuildField::Fingerprint, "ro.build.fingerprint"),
    (BuildField::Model, "ro.product.model"),
    (BuildField::Manufacturer, "ro.product.manufacturer"),
    (BuildField::Brand, "ro.product.brand"),
    (BuildField::Device, "ro.product.device"),
    (BuildField::Tags, "ro.build.tags"),
];

pub fn field_for_key(key: &str) -> Option<BuildField> {
    BUILD_PROP_KEYS
        .iter()
        .find(|(_, k)| *k == key)
        .map(|(field, _)| *field)
}

/// Parse `build.prop` text into build fields.
///
/// Lines are `key=value`; blank lines, `#` comments, `import` directives and lines without `=`
/// are skipped. `ro.*` properties are write-once on Android, so the first assignment wins.
pub fn parse_build_prop(text: &str) -> BTreeMap<BuildField, String> {
    let mut fields = BTreeMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        if let Some(field) = field_for_key(key.trim()) {
            fields
                .entry(field)
                .or_insert_with(|| value.trim().to_string());
        }
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMULATOR_PROP: &str = "\
# begin build properties
# autogenerated by buildinfo.sh
ro.build.id=UE1A.230829.036
ro.build.tags=dev-keys
ro.build.fingerprint=generic/sdk_gphone64_x86_64/emu64x:14/UE1A.230829.036/10850209:userdebug/dev-keys
ro.product.model = sdk_gphone64_x86_64
ro.product.brand=generic
ro.product.device=emu64x
import /vendor/build.prop
ro.product.manufacturer=Google
";

    #[test]
    fn parses_known_keys() {
        let fields = parse_build_prop(EMULATOR_PROP);
        assert_eq!(fields.len(), 6);
        assert_eq!(
            fields.get(&BuildField::Fingerprint).map(String::as_str),
            Some("generic/sdk_gphone64_x86_64/emu64x:14/UE1A.230829.036/10850209:userdebug/dev-keys")
        );
        assert_eq!(
            fields.get(&BuildField::Model).map(String::as_str),
            Some("sdk_gphone64_x86_64")
        );
        assert_eq!(fields.get(&BuildField::Tags).map(String::as_str), Some("dev-keys"));
    }

    #[test]
    fn first_assignment_wins() {
        let fields = parse_build_prop("ro.build.tags=release-keys\nro.build.tags=test-keys\n");
        assert_eq!(
            fields.get(&BuildField::Tags).map(String::as_str),
            Some("release-keys")
        );
    }

    #[test]
    fn empty_values_are_kept_and_junk_is_ignored() {
        let fields = parse_build_prop("ro.product.brand=\n garbage line\n=orphan\n");
        assert_eq!(fields.get(&BuildField::Brand).map(String::as_str), Some(""));
        assert_eq!(fields.len(), 1);
    }

    #[test]
    fn every_field_has_a_key() {
        for field in BuildField::ALL {
            assert!(BUILD_PROP_KEYS.iter().any(|(f, _)| *f == field), "{field}");
        }
    }
}
