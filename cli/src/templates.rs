//! Embedded HTML templates for the browse and edit pages.

use once_cell::sync::Lazy;
use tera::{Context, Tera};

static TEMPLATES: Lazy<Result<Tera, tera::Error>> = Lazy::new(|| {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        ("base.html", BASE_TEMPLATE),
        ("home.html", HOME_TEMPLATE),
        ("show.html", SHOW_TEMPLATE),
        ("about.html", ABOUT_TEMPLATE),
        ("nutrients.html", NUTRIENTS_TEMPLATE),
        ("weights.html", WEIGHTS_TEMPLATE),
        ("error.html", ERROR_TEMPLATE),
    ])?;
    Ok(tera)
});

pub fn render(template: &str, context: &Context) -> anyhow::Result<String> {
    let tera = TEMPLATES
        .as_ref()
        .map_err(|e| anyhow::anyhow!("failed to load templates: {e:?}"))?;
    tera.render(template, context)
        .map_err(|e| anyhow::anyhow!("failed to render {template}: {e:?}"))
}

const BASE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{% block title %}foodbase{% endblock %}</title>
    <style>
        body { font-family: -apple-system, "Segoe UI", Helvetica, Arial, sans-serif; margin: 0; color: #1f2328; }
        header { background: #2d6a4f; padding: 12px 32px; }
        header a { color: #fff; margin-right: 24px; text-decoration: none; font-weight: 600; }
        main { max-width: 1200px; margin: 24px auto; padding: 0 32px; }
        table { border-collapse: collapse; width: 100%; }
        th, td { border-bottom: 1px solid #d0d7de; padding: 6px 8px; text-align: left; vertical-align: top; }
        td.num { text-align: right; font-variant-numeric: tabular-nums; }
        input[type=text] { width: 100%; box-sizing: border-box; }
        .flash { background: #d8f3dc; border: 1px solid #95d5b2; padding: 8px 12px; margin-bottom: 16px; }
        .pager { margin: 16px 0; }
        .pager a { margin-right: 16px; }
        .empty { color: #57606a; }
    </style>
</head>
<body>
    <header>
        <a href="/home">Food groups</a>
        <a href="/about/">All foods</a>
    </header>
    <main>
        {% block content %}{% endblock %}
    </main>
</body>
</html>
"##;

const HOME_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block title %}Food groups · foodbase{% endblock %}
{% block content %}
<h1>Food groups</h1>
{% if all_food_group | length == 0 %}
<p class="empty">No food groups yet. Run <code>foodbase import</code> to load the dataset.</p>
{% else %}
<table>
    <tr><th>ID</th><th>Name</th></tr>
    {% for group in all_food_group %}
    <tr>
        <td>{{ group.id }}</td>
        <td><a href="/show/{{ group.id }}/">{{ group.name }}</a></td>
    </tr>
    {% endfor %}
</table>
{% endif %}
{% endblock %}
"##;

const SHOW_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block title %}Group {{ group_id }} · foodbase{% endblock %}
{% block content %}
<h1>Foods in group {{ group_id }}</h1>
{% if foods | length == 0 %}
<p class="empty">This group has no foods.</p>
{% else %}
<table>
    <tr><th>Food</th><th>Nitrogen factor</th><th>Protein factor</th><th>Fat factor</th><th>Calorie factor</th></tr>
    {% for food in foods %}
    <tr>
        <td>{{ food.short_desc }}</td>
        <td class="num">{{ food.nitrogen_factor }}</td>
        <td class="num">{{ food.protein_factor }}</td>
        <td class="num">{{ food.fat_factor }}</td>
        <td class="num">{{ food.calorie_factor }}</td>
    </tr>
    {% endfor %}
</table>
{% endif %}
{% endblock %}
"##;

const ABOUT_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block title %}Foods, page {{ current_page }} · foodbase{% endblock %}
{% block content %}
<h1>All foods</h1>
{% if message %}<div class="flash">{{ message }}</div>{% endif %}
<table>
    <tr><th>ID</th><th>Short description</th><th>Description</th><th>Manufacturer</th><th>Scientific name</th><th>Group</th><th></th></tr>
    {% if all_food | length == 0 %}
    <tr><td colspan="7" class="empty">No foods on this page.</td></tr>
    {% endif %}
    {% for food in all_food %}
    {% set form_id = "edit-" ~ food.id %}
    <tr>
        <td>
            {{ food.id }}
            <input type="hidden" form="{{ form_id }}" name="id" value="{{ food.id }}">
            <input type="hidden" form="{{ form_id }}" name="current_page" value="{{ current_page }}">
        </td>
        <td><input type="text" form="{{ form_id }}" name="short_desc" value="{{ food.short_desc }}"></td>
        <td><input type="text" form="{{ form_id }}" name="long_desc" value="{{ food.long_desc }}"></td>
        <td><input type="text" form="{{ form_id }}" name="manufac_name" value="{{ food.manufac_name }}"></td>
        <td><input type="text" form="{{ form_id }}" name="sci_name" value="{{ food.sci_name }}"></td>
        <td>
            <select form="{{ form_id }}" name="name">
                {% for group in food_groups %}
                <option value="{{ group.name }}"{% if group.name == food.group_name %} selected{% endif %}>{{ group.name }}</option>
                {% endfor %}
            </select>
        </td>
        <td>
            <form id="{{ form_id }}" method="post" action="/update"><button type="submit">Save</button></form>
            <a href="/showNutrients/{{ food.id }}-{{ current_page }}">Nutrients</a>
            <a href="/showFoodWeights/{{ food.id }}-{{ current_page }}">Weights</a>
        </td>
    </tr>
    {% endfor %}
</table>
<div class="pager">
    <a href="/about/{{ prev_page }}/">&larr; Previous</a>
    <a href="/about/{{ next_page }}/">Next &rarr;</a>
</div>
{% endblock %}
"##;

const NUTRIENTS_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block title %}Nutrients · foodbase{% endblock %}
{% block content %}
<h1>Nutrition facts{% if food %}: {{ food.long_desc }}{% endif %}</h1>
<p><a href="/about/{{ page }}/">&larr; Back to foods</a></p>
{% if nutrients | length == 0 %}
<p class="empty">No nutrition facts recorded for this food.</p>
{% else %}
<table>
    <tr><th>Nutrient</th><th>Amount</th><th>Units</th><th>Data points</th><th>Derivation</th><th>Min</th><th>Degrees of freedom</th></tr>
    {% for fact in nutrients %}
    <tr>
        <td>{{ fact.name }}</td>
        <td class="num">{{ fact.amount }}</td>
        <td>{{ fact.units }}</td>
        <td class="num">{{ fact.num_data_points }}</td>
        <td>{{ fact.derivation_code }}</td>
        <td class="num">{% if fact.min is number %}{{ fact.min }}{% endif %}</td>
        <td class="num">{% if fact.degrees_freedom is number %}{{ fact.degrees_freedom }}{% endif %}</td>
    </tr>
    {% endfor %}
</table>
{% endif %}
{% endblock %}
"##;

const WEIGHTS_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block title %}Weights · foodbase{% endblock %}
{% block content %}
<h1>Weights{% if food %}: {{ food.long_desc }}{% endif %}</h1>
<p><a href="/about/{{ page }}/">&larr; Back to foods</a></p>
{% if weights | length == 0 %}
<p class="empty">No weights recorded for this food.</p>
{% else %}
<table>
    <tr><th>Seq</th><th>Amount</th><th>Measure</th><th>Grams</th><th>Data points</th><th>Std dev</th></tr>
    {% for weight in weights %}
    <tr>
        <td class="num">{{ weight.sequence_num }}</td>
        <td class="num">{{ weight.amount }}</td>
        <td>{{ weight.description }}</td>
        <td class="num">{{ weight.gm_weight }}</td>
        <td class="num">{% if weight.num_data_pts is number %}{{ weight.num_data_pts }}{% endif %}</td>
        <td class="num">{% if weight.std_dev is number %}{{ weight.std_dev }}{% endif %}</td>
    </tr>
    {% endfor %}
</table>
{% endif %}
{% endblock %}
"##;

const ERROR_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block title %}{{ status }} · foodbase{% endblock %}
{% block content %}
<h1>{{ status }} {{ reason }}</h1>
<p>{{ message }}</p>
<p><a href="/about/">&larr; Back to foods</a></p>
{% endblock %}
"##;
