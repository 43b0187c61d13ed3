//! Built-in syntax-lowering helpers.
//!
//! Lowering class fields, object spread or `async` functions makes the oxc
//! transformer import small runtime helpers from `@oxc-project/runtime`.
//! Those imports are served from the sources below so a bundle never needs
//! that package installed. Helpers missing from the table resolve like any
//! other bare specifier.
//!
//! Each source is CommonJS whose export is the helper function itself,
//! flagged `__esModule` with a `default` pointing back at it. The
//! transformer emits `import` for ES modules and a bare `require` for
//! scripts, and both forms then get the function.

use std::path::{Path, PathBuf};

/// Specifier prefix of every helper import the transformer emits.
pub(crate) const HELPER_PREFIX: &str = "@oxc-project/runtime/helpers/";

/// A helper module linked into a bundle without touching the filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BuiltinHelper {
    /// Virtual path, also used to derive the module id
    pub path: PathBuf,
    pub source: &'static str,
}

/// Built-in helper for a `require` specifier, if there is one.
pub(crate) fn builtin_helper(specifier: &str) -> Option<BuiltinHelper> {
    let name = specifier.strip_prefix(HELPER_PREFIX)?;
    let name = name.strip_suffix(".js").unwrap_or(name);
    let source = helper_source(name)?;
    Some(BuiltinHelper {
        path: PathBuf::from(format!("{HELPER_PREFIX}{name}.js")),
        source,
    })
}

/// Source of the helper living at a virtual `path`.
pub(crate) fn source_at(path: &Path) -> Option<&'static str> {
    let name = path
        .to_str()?
        .strip_prefix(HELPER_PREFIX)?
        .strip_suffix(".js")?;
    helper_source(name)
}

fn helper_source(name: &str) -> Option<&'static str> {
    let source = match name {
        "toPropertyKey" => TO_PROPERTY_KEY,
        "defineProperty" => DEFINE_PROPERTY,
        "objectSpread2" => OBJECT_SPREAD2,
        "extends" => EXTENDS,
        "objectDestructuringEmpty" => OBJECT_DESTRUCTURING_EMPTY,
        "objectWithoutProperties" => OBJECT_WITHOUT_PROPERTIES,
        "asyncToGenerator" => ASYNC_TO_GENERATOR,
        "classPrivateFieldInitSpec" => CLASS_PRIVATE_FIELD_INIT_SPEC,
        "classPrivateMethodInitSpec" => CLASS_PRIVATE_METHOD_INIT_SPEC,
        "assertClassBrand" => ASSERT_CLASS_BRAND,
        "classPrivateFieldGet2" => CLASS_PRIVATE_FIELD_GET2,
        "classPrivateFieldSet2" => CLASS_PRIVATE_FIELD_SET2,
        "classPrivateFieldLooseKey" => CLASS_PRIVATE_FIELD_LOOSE_KEY,
        "classPrivateFieldLooseBase" => CLASS_PRIVATE_FIELD_LOOSE_BASE,
        "toSetter" => TO_SETTER,
        "checkInRHS" => CHECK_IN_RHS,
        "superPropGet" => SUPER_PROP_GET,
        "superPropSet" => SUPER_PROP_SET,
        "readOnlyError" => READ_ONLY_ERROR,
        "writeOnlyError" => WRITE_ONLY_ERROR,
        "taggedTemplateLiteral" => TAGGED_TEMPLATE_LITERAL,
        "decorate" => DECORATE,
        "decorateParam" => DECORATE_PARAM,
        "decorateMetadata" => DECORATE_METADATA,
        _ => return None,
    };
    Some(source)
}

const TO_PROPERTY_KEY: &str = r#"function toPrimitive(input, hint) {
  if (typeof input != "object" || !input) return input;
  var prim = input[Symbol.toPrimitive];
  if (prim !== undefined) {
    var res = prim.call(input, hint || "default");
    if (typeof res != "object") return res;
    throw new TypeError("@@toPrimitive must return a primitive value.");
  }
  return (hint === "string" ? String : Number)(input);
}

function toPropertyKey(arg) {
  var key = toPrimitive(arg, "string");
  return typeof key == "symbol" ? key : key + "";
}

module.exports = toPropertyKey, toPropertyKey.__esModule = true, toPropertyKey.default = toPropertyKey;
"#;

const DEFINE_PROPERTY: &str = r#"var toPropertyKey = require("@oxc-project/runtime/helpers/toPropertyKey");

function defineProperty(obj, key, value) {
  key = toPropertyKey(key);
  if (key in obj) {
    Object.defineProperty(obj, key, {
      value: value,
      enumerable: true,
      configurable: true,
      writable: true
    });
  } else {
    obj[key] = value;
  }
  return obj;
}

module.exports = defineProperty, defineProperty.__esModule = true, defineProperty.default = defineProperty;
"#;

const OBJECT_SPREAD2: &str = r#"var defineProperty = require("@oxc-project/runtime/helpers/defineProperty");

function ownKeys(object, enumerableOnly) {
  var keys = Object.keys(object);
  if (Object.getOwnPropertySymbols) {
    var symbols = Object.getOwnPropertySymbols(object);
    if (enumerableOnly) {
      symbols = symbols.filter(function (sym) {
        return Object.getOwnPropertyDescriptor(object, sym).enumerable;
      });
    }
    keys.push.apply(keys, symbols);
  }
  return keys;
}

function objectSpread2(target) {
  for (var i = 1; i < arguments.length; i++) {
    var source = arguments[i] != null ? arguments[i] : {};
    if (i % 2) {
      ownKeys(Object(source), true).forEach(function (key) {
        defineProperty(target, key, source[key]);
      });
    } else if (Object.getOwnPropertyDescriptors) {
      Object.defineProperties(target, Object.getOwnPropertyDescriptors(source));
    } else {
      ownKeys(Object(source)).forEach(function (key) {
        Object.defineProperty(target, key, Object.getOwnPropertyDescriptor(source, key));
      });
    }
  }
  return target;
}

module.exports = objectSpread2, objectSpread2.__esModule = true, objectSpread2.default = objectSpread2;
"#;

const EXTENDS: &str = r#"function assign(target) {
  for (var i = 1; i < arguments.length; i++) {
    var source = arguments[i];
    for (var key in source) {
      if (Object.prototype.hasOwnProperty.call(source, key)) {
        target[key] = source[key];
      }
    }
  }
  return target;
}

module.exports = assign, assign.__esModule = true, assign.default = assign;
"#;

const OBJECT_DESTRUCTURING_EMPTY: &str = r#"function objectDestructuringEmpty(obj) {
  if (obj == null) throw new TypeError("Cannot destructure " + obj);
}

module.exports = objectDestructuringEmpty, objectDestructuringEmpty.__esModule = true, objectDestructuringEmpty.default = objectDestructuringEmpty;
"#;

const OBJECT_WITHOUT_PROPERTIES: &str = r#"function objectWithoutProperties(source, excluded) {
  if (source == null) return {};
  var target = {};
  var key;
  for (key in source) {
    if (!Object.prototype.hasOwnProperty.call(source, key)) continue;
    if (excluded.indexOf(key) !== -1) continue;
    target[key] = source[key];
  }
  if (Object.getOwnPropertySymbols) {
    var symbols = Object.getOwnPropertySymbols(source);
    for (var i = 0; i < symbols.length; i++) {
      key = symbols[i];
      if (excluded.indexOf(key) !== -1) continue;
      if (!Object.prototype.propertyIsEnumerable.call(source, key)) continue;
      target[key] = source[key];
    }
  }
  return target;
}

module.exports = objectWithoutProperties, objectWithoutProperties.__esModule = true, objectWithoutProperties.default = objectWithoutProperties;
"#;

const ASYNC_TO_GENERATOR: &str = r#"function step(gen, resolve, reject, next, thrown, key, arg) {
  try {
    var info = gen[key](arg);
    var value = info.value;
  } catch (error) {
    reject(error);
    return;
  }
  if (info.done) {
    resolve(value);
  } else {
    Promise.resolve(value).then(next, thrown);
  }
}

function asyncToGenerator(fn) {
  return function () {
    var self = this;
    var args = arguments;
    return new Promise(function (resolve, reject) {
      var gen = fn.apply(self, args);
      function next(value) {
        step(gen, resolve, reject, next, thrown, "next", value);
      }
      function thrown(error) {
        step(gen, resolve, reject, next, thrown, "throw", error);
      }
      next(undefined);
    });
  };
}

module.exports = asyncToGenerator, asyncToGenerator.__esModule = true, asyncToGenerator.default = asyncToGenerator;
"#;

const CLASS_PRIVATE_FIELD_INIT_SPEC: &str = r#"function classPrivateFieldInitSpec(obj, privateMap, value) {
  if (privateMap.has(obj)) {
    throw new TypeError("Cannot initialize the same private elements twice on an object");
  }
  privateMap.set(obj, value);
}

module.exports = classPrivateFieldInitSpec, classPrivateFieldInitSpec.__esModule = true, classPrivateFieldInitSpec.default = classPrivateFieldInitSpec;
"#;

const CLASS_PRIVATE_METHOD_INIT_SPEC: &str = r#"function classPrivateMethodInitSpec(obj, privateSet) {
  if (privateSet.has(obj)) {
    throw new TypeError("Cannot initialize the same private elements twice on an object");
  }
  privateSet.add(obj);
}

module.exports = classPrivateMethodInitSpec, classPrivateMethodInitSpec.__esModule = true, classPrivateMethodInitSpec.default = classPrivateMethodInitSpec;
"#;

const ASSERT_CLASS_BRAND: &str = r#"function assertClassBrand(brand, receiver, value) {
  if (typeof brand == "function" ? brand === receiver : brand.has(receiver)) {
    return arguments.length < 3 ? receiver : value;
  }
  throw new TypeError("Private element is not present on this object");
}

module.exports = assertClassBrand, assertClassBrand.__esModule = true, assertClassBrand.default = assertClassBrand;
"#;

const CLASS_PRIVATE_FIELD_GET2: &str = r#"var assertClassBrand = require("@oxc-project/runtime/helpers/assertClassBrand");

function classPrivateFieldGet2(privateMap, receiver) {
  return privateMap.get(assertClassBrand(privateMap, receiver));
}

module.exports = classPrivateFieldGet2, classPrivateFieldGet2.__esModule = true, classPrivateFieldGet2.default = classPrivateFieldGet2;
"#;

const CLASS_PRIVATE_FIELD_SET2: &str = r#"var assertClassBrand = require("@oxc-project/runtime/helpers/assertClassBrand");

function classPrivateFieldSet2(privateMap, receiver, value) {
  privateMap.set(assertClassBrand(privateMap, receiver), value);
  return value;
}

module.exports = classPrivateFieldSet2, classPrivateFieldSet2.__esModule = true, classPrivateFieldSet2.default = classPrivateFieldSet2;
"#;

const CLASS_PRIVATE_FIELD_LOOSE_KEY: &str = r#"var id = 0;

function classPrivateFieldLooseKey(name) {
  return "__private_" + id++ + "_" + name;
}

module.exports = classPrivateFieldLooseKey, classPrivateFieldLooseKey.__esModule = true, classPrivateFieldLooseKey.default = classPrivateFieldLooseKey;
"#;

const CLASS_PRIVATE_FIELD_LOOSE_BASE: &str = r#"function classPrivateFieldLooseBase(receiver, privateKey) {
  if (!Object.prototype.hasOwnProperty.call(receiver, privateKey)) {
    throw new TypeError("attempted to use private field on non-instance");
  }
  return receiver;
}

module.exports = classPrivateFieldLooseBase, classPrivateFieldLooseBase.__esModule = true, classPrivateFieldLooseBase.default = classPrivateFieldLooseBase;
"#;

const TO_SETTER: &str = r#"function toSetter(fn, args, thisArg) {
  if (!args) args = [];
  var index = args.length++;
  return Object.defineProperty({}, "_", {
    set: function (value) {
      args[index] = value;
      fn.apply(thisArg, args);
    }
  });
}

module.exports = toSetter, toSetter.__esModule = true, toSetter.default = toSetter;
"#;

const CHECK_IN_RHS: &str = r#"function checkInRHS(value) {
  if (Object(value) !== value) {
    throw new TypeError(
      "right-hand side of 'in' should be an object, got " + (value !== null ? typeof value : "null")
    );
  }
  return value;
}

module.exports = checkInRHS, checkInRHS.__esModule = true, checkInRHS.default = checkInRHS;
"#;

const SUPER_PROP_GET: &str = r#"function superPropGet(classArg, property, receiver, flags) {
  var home = Object.getPrototypeOf(flags & 1 ? classArg.prototype : classArg);
  var result = Reflect.get(home, property, receiver);
  if (flags & 2 && typeof result == "function") {
    return function (args) {
      return result.apply(receiver, args);
    };
  }
  return result;
}

module.exports = superPropGet, superPropGet.__esModule = true, superPropGet.default = superPropGet;
"#;

const SUPER_PROP_SET: &str = r#"function superPropSet(classArg, property, value, receiver, isStrict, prototype) {
  var home = Object.getPrototypeOf(prototype ? classArg.prototype : classArg);
  if (!Reflect.set(home, property, value, receiver) && isStrict) {
    throw new TypeError("failed to set property");
  }
  return value;
}

module.exports = superPropSet, superPropSet.__esModule = true, superPropSet.default = superPropSet;
"#;

const READ_ONLY_ERROR: &str = r#"function readOnlyError(name) {
  throw new TypeError('"' + name + '" is read-only');
}

module.exports = readOnlyError, readOnlyError.__esModule = true, readOnlyError.default = readOnlyError;
"#;

const WRITE_ONLY_ERROR: &str = r#"function writeOnlyError(name) {
  throw new TypeError('"' + name + '" is write-only');
}

module.exports = writeOnlyError, writeOnlyError.__esModule = true, writeOnlyError.default = writeOnlyError;
"#;

const TAGGED_TEMPLATE_LITERAL: &str = r#"function taggedTemplateLiteral(strings, raw) {
  if (!raw) raw = strings.slice(0);
  return Object.freeze(Object.defineProperties(strings, { raw: { value: Object.freeze(raw) } }));
}

module.exports = taggedTemplateLiteral, taggedTemplateLiteral.__esModule = true, taggedTemplateLiteral.default = taggedTemplateLiteral;
"#;

const DECORATE: &str = r#"function decorate(decorators, target, key, desc) {
  var c = arguments.length;
  var r = c < 3 ? target : desc === null ? (desc = Object.getOwnPropertyDescriptor(target, key)) : desc;
  var d;
  if (typeof Reflect === "object" && typeof Reflect.decorate === "function") {
    r = Reflect.decorate(decorators, target, key, desc);
  } else {
    for (var i = decorators.length - 1; i >= 0; i--) {
      if ((d = decorators[i])) r = (c < 3 ? d(r) : c > 3 ? d(target, key, r) : d(target, key)) || r;
    }
  }
  if (c > 3 && r) Object.defineProperty(target, key, r);
  return r;
}

module.exports = decorate, decorate.__esModule = true, decorate.default = decorate;
"#;

const DECORATE_PARAM: &str = r#"function decorateParam(paramIndex, decorator) {
  return function (target, key) {
    decorator(target, key, paramIndex);
  };
}

module.exports = decorateParam, decorateParam.__esModule = true, decorateParam.default = decorateParam;
"#;

const DECORATE_METADATA: &str = r#"function decorateMetadata(key, value) {
  if (typeof Reflect === "object" && typeof Reflect.metadata === "function") {
    return Reflect.metadata(key, value);
  }
}

module.exports = decorateMetadata, decorateMetadata.__esModule = true, decorateMetadata.default = decorateMetadata;
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::ModuleSource;
    use crate::pipeline::stages::parse;
    use oxc_allocator::Allocator;

    #[test]
    fn test_lookup_by_specifier_and_path() {
        let helper = builtin_helper("@oxc-project/runtime/helpers/defineProperty").unwrap();
        assert_eq!(
            helper.path,
            Path::new("@oxc-project/runtime/helpers/defineProperty.js")
        );
        assert_eq!(source_at(&helper.path), Some(helper.source));

        assert_eq!(
            builtin_helper("@oxc-project/runtime/helpers/defineProperty.js"),
            Some(helper)
        );
        assert!(builtin_helper("@oxc-project/runtime/helpers/usingCtx").is_none());
        assert!(builtin_helper("defineProperty").is_none());
        assert!(source_at(Path::new("/src/defineProperty.js")).is_none());
    }

    #[test]
    fn test_every_helper_is_a_script_requiring_only_helpers() {
        for name in [
            "toPropertyKey",
            "defineProperty",
            "objectSpread2",
            "extends",
            "objectDestructuringEmpty",
            "objectWithoutProperties",
            "asyncToGenerator",
            "classPrivateFieldInitSpec",
            "classPrivateMethodInitSpec",
            "assertClassBrand",
            "classPrivateFieldGet2",
            "classPrivateFieldSet2",
            "classPrivateFieldLooseKey",
            "classPrivateFieldLooseBase",
            "toSetter",
            "checkInRHS",
            "superPropGet",
            "superPropSet",
            "readOnlyError",
            "writeOnlyError",
            "taggedTemplateLiteral",
            "decorate",
            "decorateParam",
            "decorateMetadata",
        ] {
            let helper = builtin_helper(&format!("{HELPER_PREFIX}{name}")).unwrap();
            let module = ModuleSource::new(helper.path.clone(), helper.source);
            let allocator = Allocator::default();
            let program = parse(&allocator, &module)
                .unwrap_or_else(|e| panic!("{name} does not parse: {e}"));
            assert!(
                program
                    .body
                    .iter()
                    .all(|stmt| stmt.as_module_declaration().is_none()),
                "{name} uses module syntax"
            );

            assert!(helper.source.contains(".__esModule = true"), "{name} lacks interop flag");
            for dependency in helper.source.split("require(\"").skip(1) {
                let specifier = &dependency[..dependency.find('"').unwrap()];
                assert!(
                    builtin_helper(specifier).is_some(),
                    "{name} requires unknown helper {specifier}"
                );
            }
        }
    }
}
