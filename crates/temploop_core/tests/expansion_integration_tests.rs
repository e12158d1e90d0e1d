//! Integration tests for the expansion engine and request boundary.

use serde_json::{json, Value};

use temploop_core::{
    concrete_name, handle, handle_value, ExpansionConfig, TransformRequest, TransformStatus,
};

fn macro_event() -> Value {
    json!({
        "region": "ap-northeast-1",
        "accountId": "111111111111",
        "params": {},
        "fragment": {
            "AWSTemplateFormatVersion": "2010-09-09",
            "Outputs": {
                "TestResourceArnList": {
                    "Value": {
                        "Fn::Join": [",", {"Fn::GetAtt": "TestResource.Arn"}]
                    }
                }
            },
            "Resources": {
                "TestResource": {
                    "Type": "List<AWS::Test::Test>",
                    "Metadata": {"TempLoop::Iteration": {"Ref": "Names"}},
                    "Properties": {
                        "Name": {"Ref": "TempLoop::Item"},
                        "Description": {"Fn::Sub": "resource-${TempLoop::Item}"}
                    }
                }
            },
            "Description": "description",
            "Parameters": {"Names": {"Type": "CommaDelimitedList"}}
        },
        "transformId": "yyyy",
        "requestId": "xxxx",
        "templateParameterValues": {"Names": ["test1", "test2", "test3"]}
    })
}

/// Full request with a parameter-driven directive.
#[test]
fn test_handler_expands_names() {
    let response = handle_value(&macro_event(), &ExpansionConfig::default());

    assert_eq!(response.status, TransformStatus::Success);
    assert_eq!(response.request_id, "xxxx");

    let resources = response.fragment["Resources"].as_object().unwrap();
    assert_eq!(resources.len(), 3);

    for (index, expected) in ["test1", "test2", "test3"].iter().enumerate() {
        let name = concrete_name("TestResource", index, 12);
        let resource = &resources[&name];
        assert_eq!(resource["Type"], json!("AWS::Test::Test"));
        assert_eq!(resource["Properties"]["Name"], json!(expected));
        assert_eq!(
            resource["Properties"]["Description"],
            json!(format!("resource-{}", expected))
        );
        assert!(resource.get("Metadata").is_none());
    }

    let first = &resources["TestResourceCAA2B7298F97"];
    assert_eq!(first["Properties"]["Name"], json!("test1"));
}

/// Output references become an ordered list of attribute lookups.
#[test]
fn test_output_get_att_rewritten_in_order() {
    let response = handle_value(&macro_event(), &ExpansionConfig::default());
    let value = &response.fragment["Outputs"]["TestResourceArnList"]["Value"];

    let expected: Vec<Value> = (0..3)
        .map(|i| json!({"Fn::GetAtt": format!("{}.Arn", concrete_name("TestResource", i, 12))}))
        .collect();
    assert_eq!(value["Fn::Join"][0], json!(","));
    assert_eq!(value["Fn::Join"][1], Value::Array(expected));
}

/// Pass-through fields survive and the input is left untouched.
#[test]
fn test_pass_through_fields_and_input_untouched() {
    let event = macro_event();
    let before = event.clone();
    let response = handle_value(&event, &ExpansionConfig::default());

    assert_eq!(event, before);
    assert_eq!(response.fragment["Description"], json!("description"));
    assert_eq!(response.fragment["AWSTemplateFormatVersion"], json!("2010-09-09"));
    assert_eq!(response.fragment["Parameters"], before["fragment"]["Parameters"]);
}

/// A list resource without a directive fails the whole request.
#[test]
fn test_missing_directive_returns_original_fragment() {
    let mut event = macro_event();
    event["fragment"]["Resources"]["Other"] = json!({
        "Type": "List<AWS::Test::Other>",
        "Properties": {"Name": "!Ref TempLoop::Item"}
    });

    let response = handle_value(&event, &ExpansionConfig::default());

    assert_eq!(response.status, TransformStatus::Fail);
    assert_eq!(response.request_id, "xxxx");
    assert_eq!(response.fragment, event["fragment"]);
}

/// Overrides for undeclared parameters are rejected.
#[test]
fn test_undeclared_override_fails() {
    let mut event = macro_event();
    event["templateParameterValues"]["Unknown"] = json!("x");

    let response = handle_value(&event, &ExpansionConfig::default());
    assert_eq!(response.status, TransformStatus::Fail);
    assert_eq!(response.fragment, event["fragment"]);
}

/// A comma-separated default drives the directive without an override.
#[test]
fn test_comma_delimited_default() {
    let mut event = macro_event();
    event["fragment"]["Parameters"]["Names"]["Default"] = json!("a, b");
    event["templateParameterValues"] = json!({});

    let response = handle_value(&event, &ExpansionConfig::default());
    assert!(response.is_success());

    let names: Vec<&Value> = response.fragment["Resources"]
        .as_object()
        .unwrap()
        .values()
        .map(|r| &r["Properties"]["Name"])
        .collect();
    assert_eq!(names, vec![&json!("a"), &json!("b")]);
}

/// Short-form references across resources, and references to plain resources.
#[test]
fn test_cross_resource_rewrite() {
    let request = TransformRequest {
        request_id: "r-1".to_string(),
        fragment: json!({
            "Resources": {
                "TestResource": {
                    "Type": "List<AWS::Test::Test>",
                    "Metadata": {"TempLoop::Iteration": "!Range 2"},
                    "Properties": {
                        "TestProperty": "test",
                        "TestLoopProperty": {
                            "Name": "!Ref TempLoop::Item",
                            "Test": {"Fn::Sub": "aaaa-${TempLoop::Item}-fewafew${TempLoop::Item}"},
                            "Arn": {"Ref": "AWS::AccountId"}
                        }
                    }
                },
                "TestResourceHoge": {
                    "Type": "AWS::Test::Test1",
                    "Properties": {
                        "TestRefProperty": "!Ref TestResource",
                        "TestGetAttProperty": "!GetAtt TestResource.Arn",
                        "TestSubProperty": "!Sub hoge-${TestResource.Name}-aaa",
                        "TestProperty": "test"
                    }
                }
            }
        }),
        ..Default::default()
    };

    let response = handle(&request, &ExpansionConfig::default());
    assert!(response.is_success());

    let resources = response.fragment["Resources"].as_object().unwrap();
    assert_eq!(resources.len(), 3);

    let first = concrete_name("TestResource", 0, 12);
    let second = concrete_name("TestResource", 1, 12);

    let loop_props = &resources[&second]["Properties"]["TestLoopProperty"];
    assert_eq!(loop_props["Name"], json!(1));
    assert_eq!(loop_props["Test"], json!("aaaa-1-fewafew1"));
    assert_eq!(loop_props["Arn"], json!({"Ref": "AWS::AccountId"}));

    let hoge = &resources["TestResourceHoge"]["Properties"];
    assert_eq!(hoge["TestRefProperty"], json!([{"Ref": first}, {"Ref": second}]));
    assert_eq!(
        hoge["TestGetAttProperty"],
        json!([
            {"Fn::GetAtt": format!("{}.Arn", first)},
            {"Fn::GetAtt": format!("{}.Arn", second)}
        ])
    );
    assert_eq!(hoge["TestSubProperty"], json!("!Sub hoge-${TestResource.Name}-aaa"));
    assert_eq!(hoge["TestProperty"], json!("test"));
}

/// Repeated runs produce identical output.
#[test]
fn test_deterministic_across_runs() {
    let config = ExpansionConfig::default();
    let first = handle_value(&macro_event(), &config);
    let second = handle_value(&macro_event(), &config);
    assert_eq!(first, second);
}

/// Plain resources come back exactly as sent, whatever their shape.
#[test]
fn test_irregular_plain_resources_pass_through() {
    for resource in [
        json!({"Type": "AWS::S3::Bucket", "Metadata": "note"}),
        json!({"Type": "AWS::S3::Bucket", "Properties": null}),
    ] {
        let request = TransformRequest {
            request_id: "r-2".to_string(),
            fragment: json!({"Resources": {"B": resource}, "Outputs": null}),
            ..Default::default()
        };

        let response = handle(&request, &ExpansionConfig::default());
        assert!(response.is_success());
        assert_eq!(response.fragment, request.fragment);
    }
}

/// An oversized range fails the request instead of allocating it.
#[test]
fn test_oversized_range_fails_request() {
    let mut event = macro_event();
    event["fragment"]["Resources"]["TestResource"]["Metadata"]["TempLoop::Iteration"] =
        json!("!Range 100000000000");

    let response = handle_value(&event, &ExpansionConfig::default());
    assert_eq!(response.status, TransformStatus::Fail);
    assert_eq!(response.fragment, event["fragment"]);
}
